//! The timestep loop.
//!
//! A [`Simulation`] owns the [`Context`] and the [`Population`]. Sweeps are registered under an
//! integer group; each timestep runs the groups in ascending order and the sweeps of a group in
//! the order they were added, then calls every reporter.
//!
//! Any error from a sweep or a reporter aborts the run: `simulate` returns it immediately, the
//! remaining sweeps and timesteps are skipped, and reporters are not torn down.
use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};

use crate::context::Context;
use crate::error::EpiabmError;
use crate::population::{Population, Timestep};
use crate::report::TimestepReporter;
use crate::sweep::Sweep;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Constructed,
    Setup,
    Running,
    TornDown,
}

pub struct Simulation {
    context: Context,
    population: Population,
    sweeps: BTreeMap<u32, Vec<Box<dyn Sweep>>>,
    reporters: Vec<Box<dyn TimestepReporter>>,
    state: SimulationState,
}

impl Simulation {
    pub fn new(context: Context, population: Population) -> Self {
        Simulation {
            context,
            population,
            sweeps: BTreeMap::new(),
            reporters: Vec::new(),
            state: SimulationState::Constructed,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Registers `sweep` to run in `group`.
    pub fn add_sweep(&mut self, sweep: Box<dyn Sweep>, group: u32) {
        debug!("adding {} sweep to group {group}", sweep.name());
        self.sweeps.entry(group).or_default().push(sweep);
    }

    pub fn add_timestep_reporter(&mut self, reporter: Box<dyn TimestepReporter>) {
        self.reporters.push(reporter);
    }

    /// Runs `timesteps` timesteps. Every call starts a fresh run from timestep 1 on the current
    /// population state.
    pub fn simulate(&mut self, timesteps: Timestep) -> Result<(), EpiabmError> {
        self.setup()?;

        self.state = SimulationState::Running;
        info!("starting simulation for {timesteps} timesteps");
        let start = Instant::now();
        for timestep in 1..=timesteps {
            self.step(timestep)?;
        }
        info!(
            "simulation finished in {}",
            humantime::format_duration(start.elapsed())
        );

        self.teardown()
    }

    /// Returns the context and population, ending the simulation.
    pub fn into_parts(self) -> (Context, Population) {
        (self.context, self.population)
    }

    fn setup(&mut self) -> Result<(), EpiabmError> {
        self.context.set_current_timestep(0);
        self.population.initialize();
        for sweep in self.sweeps.values_mut().flatten() {
            sweep.bind_population(&self.population);
        }
        for reporter in &mut self.reporters {
            reporter.setup(&self.population)?;
        }
        self.state = SimulationState::Setup;
        debug!(
            "simulation set up with {} people in {} cells",
            self.population.total_people(),
            self.population.cells().len()
        );
        self.report(0)
    }

    fn step(&mut self, timestep: Timestep) -> Result<(), EpiabmError> {
        self.context.set_current_timestep(timestep);
        for (group, sweeps) in &mut self.sweeps {
            for sweep in sweeps {
                sweep
                    .apply(&self.context, &mut self.population, timestep)
                    .map_err(|e| {
                        debug!(
                            "{} sweep in group {group} failed at timestep {timestep}",
                            sweep.name()
                        );
                        e
                    })?;
            }
        }
        self.report(timestep)
    }

    fn report(&mut self, timestep: Timestep) -> Result<(), EpiabmError> {
        for reporter in &mut self.reporters {
            reporter.report(&self.population, timestep)?;
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), EpiabmError> {
        for reporter in &mut self.reporters {
            reporter.teardown()?;
        }
        self.state = SimulationState::TornDown;
        debug!("simulation torn down");
        Ok(())
    }
}
