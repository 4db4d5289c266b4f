use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::error::EpiabmError;
use crate::log::{info, set_log_level, LevelFilter};
use crate::population::{HouseholdLinker, PlaceLinker, PopulationFactory};
use crate::random::ContextRandomExt;
use crate::report::{CellCompartmentReporter, PopulationCompartmentReporter};
use crate::simulation::Simulation;
use crate::sweep::{
    HostProgressionSweep, HouseholdSweep, PlaceSweep, RandomSeedSweep, SpatialSweep, Sweep,
};

pub const POPULATION_REPORT: &str = "population_compartments.csv";
pub const CELL_REPORT: &str = "cell_compartments.csv";

/// Command line arguments of the `epiabm` runner
#[derive(Args, Clone, Debug)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON simulation config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the CSV reports
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of timesteps to simulate
    #[arg(short, long, default_value = "100")]
    pub timesteps: u32,

    /// Number of cells
    #[arg(long, default_value = "100")]
    pub cells: usize,

    /// Number of microcells in each cell
    #[arg(long, default_value = "10")]
    pub microcells: usize,

    /// Total number of people
    #[arg(long, default_value = "10000")]
    pub people: usize,

    /// Number of households to link
    #[arg(long, default_value = "2000")]
    pub households: usize,

    /// Largest household size
    #[arg(long, default_value = "5")]
    pub max_household_size: usize,

    /// Number of places to create
    #[arg(long, default_value = "500")]
    pub places: usize,

    /// Largest number of members in a place
    #[arg(long, default_value = "20")]
    pub max_place_size: usize,

    /// Number of people infected before the first timestep
    #[arg(long, default_value = "100")]
    pub initial_infections: usize,

    /// Enable logging at this level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: 0,
            config: None,
            output_dir: PathBuf::from("."),
            timesteps: 100,
            cells: 100,
            microcells: 10,
            people: 10_000,
            households: 2000,
            max_household_size: 5,
            places: 500,
            max_place_size: 20,
            initial_infections: 100,
            log_level: None,
        }
    }
}

fn create_epiabm_cli() -> Command {
    let cli = Command::new("epiabm");
    BaseArgs::augment_args(cli)
}

/// Parses the command line and runs a simulation with it.
///
/// # Errors
/// Returns an error if argument parsing or the simulation fails
pub fn run_with_args() -> Result<Simulation, Box<dyn std::error::Error>> {
    let matches = create_epiabm_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_base_args(args)?)
}

/// Builds a uniform population, links households and places, seeds infections, and runs
/// household, place and spatial transmission (group 0) followed by host progression (group 1),
/// writing both compartment reports to `args.output_dir`.
///
/// # Errors
/// Returns an error if the population shape or config is invalid, a report cannot be created, or
/// the run fails
pub fn run_with_base_args(args: BaseArgs) -> Result<Simulation, EpiabmError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    if args.cells == 0 || args.microcells == 0 {
        return Err(EpiabmError::ConfigError(format!(
            "need at least one cell and one microcell per cell, got {} cells of {} microcells",
            args.cells, args.microcells
        )));
    }

    let config = match &args.config {
        Some(path) => {
            info!("loading simulation config from {}", path.display());
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };

    let mut context = Context::new();
    context.init_random(args.random_seed);

    let mut population = PopulationFactory::make_population(args.cells, args.microcells, args.people);
    if args.households > 0 {
        HouseholdLinker::link_households(
            &context,
            &mut population,
            args.max_household_size,
            args.households,
        )?;
    }
    if args.places > 0 {
        PlaceLinker::link_places(&context, &mut population, args.max_place_size, args.places)?;
    }
    population.initialize();
    RandomSeedSweep::new(&config, args.initial_infections).apply(&context, &mut population, 0)?;

    let mut simulation = Simulation::new(context, population);
    simulation.add_sweep(Box::new(HouseholdSweep::new(&config)), 0);
    simulation.add_sweep(Box::new(PlaceSweep::new(&config)), 0);
    simulation.add_sweep(Box::new(SpatialSweep::new(&config)), 0);
    simulation.add_sweep(Box::new(HostProgressionSweep::new(&config)), 1);
    simulation.add_timestep_reporter(Box::new(PopulationCompartmentReporter::new(
        args.output_dir.join(POPULATION_REPORT),
    )?));
    simulation.add_timestep_reporter(Box::new(CellCompartmentReporter::new(
        args.output_dir.join(CELL_REPORT),
    )?));

    simulation.simulate(args.timesteps)?;
    Ok(simulation)
}
