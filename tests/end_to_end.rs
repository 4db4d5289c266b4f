use std::cell::RefCell;
use std::rc::Rc;

use epiabm::prelude::*;
use epiabm::CompartmentCounter;

#[derive(Default)]
struct Observations {
    setups: usize,
    timesteps: Vec<Timestep>,
    counters: Vec<CompartmentCounter>,
    torn_down: bool,
}

// Records the population-wide counts every timestep and checks that nobody is gained or lost.
struct ConservationReporter {
    expected_total: usize,
    observations: Rc<RefCell<Observations>>,
}

impl TimestepReporter for ConservationReporter {
    fn setup(&mut self, _population: &Population) -> Result<(), EpiabmError> {
        self.observations.borrow_mut().setups += 1;
        Ok(())
    }

    fn report(&mut self, population: &Population, timestep: Timestep) -> Result<(), EpiabmError> {
        let counter = population.compartment_counter();
        if counter.total() != self.expected_total {
            return Err(EpiabmError::ReportError(format!(
                "{} people counted at timestep {timestep}",
                counter.total()
            )));
        }
        let mut observations = self.observations.borrow_mut();
        observations.timesteps.push(timestep);
        observations.counters.push(counter);
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), EpiabmError> {
        self.observations.borrow_mut().torn_down = true;
        Ok(())
    }
}

fn build_simulation(
    seed: u64,
    config: &SimulationConfig,
    population: Population,
    initial_infections: usize,
) -> (Simulation, Rc<RefCell<Observations>>) {
    let mut context = Context::new();
    context.init_random(seed);
    let mut population = population;
    population.initialize();
    RandomSeedSweep::new(config, initial_infections)
        .apply(&context, &mut population, 0)
        .unwrap();

    let observations = Rc::new(RefCell::new(Observations::default()));
    let expected_total = population.total_people();
    let mut simulation = Simulation::new(context, population);
    simulation.add_sweep(Box::new(HouseholdSweep::new(config)), 0);
    simulation.add_sweep(Box::new(PlaceSweep::new(config)), 0);
    simulation.add_sweep(Box::new(SpatialSweep::new(config)), 0);
    simulation.add_sweep(Box::new(HostProgressionSweep::new(config)), 1);
    simulation.add_timestep_reporter(Box::new(ConservationReporter {
        expected_total,
        observations: Rc::clone(&observations),
    }));
    (simulation, observations)
}

fn linked_population(seed: u64) -> Population {
    let mut context = Context::new();
    context.init_random(seed);
    let mut population = PopulationFactory::make_population(10, 10, 1000);
    let linked = HouseholdLinker::link_households(&context, &mut population, 5, 100).unwrap();
    assert!(linked >= 100);
    PlaceLinker::link_places(&context, &mut population, 10, 50).unwrap();
    population
}

#[test]
fn full_run_conserves_people() {
    let config = SimulationConfig::default();
    let (mut simulation, observations) =
        build_simulation(42, &config, linked_population(42), 200);

    simulation.simulate(100).unwrap();

    let observations = observations.borrow();
    assert_eq!(observations.setups, 1);
    assert!(observations.torn_down);
    assert_eq!(observations.timesteps, (0..=100).collect::<Vec<_>>());

    let first = &observations.counters[0];
    assert_eq!(first.count(InfectionStatus::InfectMild), 200);
    assert_eq!(first.count(InfectionStatus::Susceptible), 800);

    let last = observations.counters.last().unwrap();
    let finished = last.count(InfectionStatus::Recovered) + last.count(InfectionStatus::Dead);
    assert!(finished <= 1000);
    assert!(finished > 0);
    assert_eq!(simulation.state(), epiabm::SimulationState::TornDown);
}

#[test]
fn terminal_counts_never_decrease() {
    let config = SimulationConfig::default();
    let (mut simulation, observations) =
        build_simulation(7, &config, linked_population(7), 200);
    simulation.simulate(60).unwrap();

    let observations = observations.borrow();
    for pair in observations.counters.windows(2) {
        assert!(pair[1].count(InfectionStatus::Recovered) >= pair[0].count(InfectionStatus::Recovered));
        assert!(pair[1].count(InfectionStatus::Dead) >= pair[0].count(InfectionStatus::Dead));
        assert!(
            pair[1].count(InfectionStatus::Susceptible)
                <= pair[0].count(InfectionStatus::Susceptible)
        );
    }
}

#[test]
fn runs_are_reproducible() {
    let config = SimulationConfig::default();
    let final_counts = |seed| {
        let (mut simulation, observations) =
            build_simulation(seed, &config, linked_population(seed), 200);
        simulation.simulate(30).unwrap();
        let counters = observations.borrow().counters.clone();
        counters
    };
    assert_eq!(final_counts(3), final_counts(3));
}

#[test]
fn isolated_person_progresses_through_host_progression_alone() {
    let config = SimulationConfig::default();
    // A single person: no household, no place and no other cell to reach
    let population = PopulationFactory::make_population(1, 1, 1);
    let (mut simulation, observations) = build_simulation(5, &config, population, 1);

    simulation.simulate(2000).unwrap();

    let observations = observations.borrow();
    let statuses: Vec<InfectionStatus> = observations
        .counters
        .iter()
        .map(|counter| {
            counter
                .iter()
                .find(|(_, count)| *count == 1)
                .map(|(status, _)| status)
                .unwrap()
        })
        .collect();

    assert_eq!(statuses[0], InfectionStatus::InfectMild);
    assert!(statuses.last().unwrap().is_terminal());
    assert!(!statuses.contains(&InfectionStatus::Susceptible));
    let person = simulation.population().person(PersonAddress::new(0, 0, 0));
    assert!(person.params().status_change_time > 0);
    assert_eq!(person.params().next_status_time, None);
}

#[test]
fn reporter_error_aborts_run() {
    let config = SimulationConfig::default();
    let (mut simulation, observations) = build_simulation(1, &config, linked_population(1), 10);
    // Misreport the expected total so the first report fails
    simulation.add_timestep_reporter(Box::new(ConservationReporter {
        expected_total: 999,
        observations: Rc::new(RefCell::new(Observations::default())),
    }));

    let result = simulation.simulate(10);
    assert!(matches!(result, Err(EpiabmError::ReportError(_))));
    let observations = observations.borrow();
    assert_eq!(observations.timesteps, vec![0]);
    assert!(!observations.torn_down);
}

#[test]
fn place_transmission_alone_spreads_within_places() {
    let mut config = SimulationConfig::default();
    config.infection.household_transmission = 0.0;
    config.infection.spatial_r0 = 0.0;
    config.infection.place_transmission = 1.0;
    config.infection.mean_group_size = 1.0;

    let mut context = Context::new();
    context.init_random(12);
    // One person per microcell, so every place has a single member
    let mut isolated = PopulationFactory::make_population(1, 20, 20);
    PlaceLinker::link_places(&context, &mut isolated, 5, 20).unwrap();
    let (mut simulation, observations) = build_simulation(12, &config, isolated, 5);
    simulation.simulate(20).unwrap();
    let last = observations.borrow().counters.last().unwrap().clone();
    assert_eq!(last.count(InfectionStatus::Susceptible), 15);

    let mut crowded = PopulationFactory::make_population(1, 1, 20);
    PlaceLinker::link_places(&context, &mut crowded, 20, 10).unwrap();
    let (mut simulation, observations) = build_simulation(12, &config, crowded, 5);
    simulation.simulate(20).unwrap();
    let last = observations.borrow().counters.last().unwrap().clone();
    assert!(last.count(InfectionStatus::Susceptible) < 15);
}
