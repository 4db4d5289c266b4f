use log::debug;

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::{Cell, Household, Person, PersonAddress, Population, Timestep};
use crate::progression::DiseaseProgression;
use crate::random::ContextRandomExt;
use crate::sweep::{apply_infections, Sweep};

define_rng!(HouseholdSweepRng);

/// Transmission between members of the same household.
///
/// Each infectious person tries once per timestep to infect every susceptible co-member, succeeding
/// with probability `household_inf(infector) * household_susc(infectee)`.
pub struct HouseholdSweep {
    household_transmission: f64,
    progression: DiseaseProgression,
}

impl HouseholdSweep {
    pub fn new(config: &SimulationConfig) -> Self {
        HouseholdSweep {
            household_transmission: config.infection.household_transmission,
            progression: DiseaseProgression::new(config),
        }
    }

    pub fn household_inf(&self, infector: &Person, household: &Household) -> f64 {
        self.household_transmission
            * infector.params().infectiousness
            * household.infectiousness()
    }

    pub fn household_susc(&self, infectee: &Person, household: &Household) -> f64 {
        infectee.params().susceptibility * household.susceptibility()
    }

    fn collect_infections(&self, context: &Context, cell: &Cell, pending: &mut Vec<PersonAddress>) {
        for microcell in cell.microcells() {
            for household in microcell.households() {
                for &infector in household.members() {
                    let infector = cell.person(infector);
                    if !infector.is_infectious() {
                        continue;
                    }
                    let inf = self.household_inf(infector, household);
                    for &infectee in household.members() {
                        let infectee = cell.person(infectee);
                        if !infectee.is_susceptible() {
                            continue;
                        }
                        let probability = inf * self.household_susc(infectee, household);
                        if context.sample_bool(HouseholdSweepRng, probability.clamp(0.0, 1.0)) {
                            pending.push(PersonAddress::new(
                                cell.index(),
                                microcell.cell_pos(),
                                infectee.cell_pos(),
                            ));
                        }
                    }
                }
            }
        }
    }
}

impl Sweep for HouseholdSweep {
    fn name(&self) -> &'static str {
        "household"
    }

    fn apply(
        &mut self,
        context: &Context,
        population: &mut Population,
        timestep: Timestep,
    ) -> Result<(), EpiabmError> {
        let mut pending = Vec::new();
        for cell in population.cells() {
            self.collect_infections(context, cell, &mut pending);
        }
        let infected =
            apply_infections(context, population, &self.progression, &pending, timestep);
        debug!("household sweep at timestep {timestep}: {infected} new infections");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::InfectionStatus;

    // One cell, one microcell, one household holding all `n` residents.
    fn household_population(n: usize) -> Population {
        let mut population = Population::new();
        let cell = population.add_cell((0.0, 0.0));
        let cell = population.cell_mut(cell);
        let microcell = cell.add_microcell();
        let household = cell.microcell_mut(microcell).add_household();
        for _ in 0..n {
            let person = cell.add_person(microcell);
            cell.add_person_to_household(person, household).unwrap();
        }
        population.initialize();
        population
    }

    fn make_infector(population: &mut Population, person: usize, infectiousness: f64) {
        let cell = population.cell_mut(0);
        cell.update_person_status(person, InfectionStatus::InfectMild, 0);
        cell.person_mut(person).params_mut().infectiousness = infectiousness;
    }

    fn context() -> Context {
        let mut context = Context::new();
        context.init_random(8);
        context
    }

    fn sweep(household_transmission: f64) -> HouseholdSweep {
        let mut config = SimulationConfig::default();
        config.infection.household_transmission = household_transmission;
        HouseholdSweep::new(&config)
    }

    #[test]
    fn certain_transmission_infects_everyone() {
        let context = context();
        let mut population = household_population(4);
        make_infector(&mut population, 0, 1.0);

        sweep(1.0).apply(&context, &mut population, 1).unwrap();

        let cell = population.cell(0);
        for person in 1..4 {
            assert_eq!(cell.person(person).status(), InfectionStatus::Exposed);
            assert!(cell.person(person).params().next_status_time.unwrap() > 1);
        }
        assert_eq!(cell.person(0).status(), InfectionStatus::InfectMild);
        let counter = population.compartment_counter();
        assert_eq!(counter.count(InfectionStatus::Exposed), 3);
        assert_eq!(counter.total(), 4);
    }

    #[test]
    fn probability_above_one_is_certain() {
        let context = context();
        let mut population = household_population(5);
        make_infector(&mut population, 0, 10.0);

        sweep(0.5).apply(&context, &mut population, 1).unwrap();
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Exposed),
            4
        );
    }

    #[test]
    fn zero_transmission_infects_nobody() {
        let context = context();
        let mut population = household_population(4);
        make_infector(&mut population, 0, 5.0);

        sweep(0.0).apply(&context, &mut population, 1).unwrap();
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Susceptible),
            3
        );
    }

    #[test]
    fn household_multipliers_apply() {
        let context = context();
        let mut population = household_population(3);
        make_infector(&mut population, 0, 1.0);
        population
            .cell_mut(0)
            .microcell_mut(0)
            .households_mut()[0]
            .set_susceptibility(0.0);

        sweep(1.0).apply(&context, &mut population, 1).unwrap();
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Susceptible),
            2
        );
    }

    #[test]
    fn people_outside_households_are_untouched() {
        let context = context();
        let mut population = household_population(2);
        let loner = population.cell_mut(0).add_person(0);
        population.initialize();
        make_infector(&mut population, 0, 1.0);

        sweep(1.0).apply(&context, &mut population, 1).unwrap();
        let cell = population.cell(0);
        assert_eq!(cell.person(1).status(), InfectionStatus::Exposed);
        assert_eq!(cell.person(loner).status(), InfectionStatus::Susceptible);
    }

    #[test]
    fn probability_terms() {
        let mut population = household_population(2);
        make_infector(&mut population, 0, 0.5);
        let cell = population.cell(0);
        let household = cell.household_of(0).unwrap();
        let sweep = sweep(0.4);
        assert_eq!(sweep.household_inf(cell.person(0), household), 0.2);
        assert_eq!(sweep.household_susc(cell.person(1), household), 1.0);
    }
}
