use log::debug;

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::error::EpiabmError;
use crate::population::{Population, Timestep};
use crate::progression::DiseaseProgression;
use crate::sweep::Sweep;

/// Moves every person whose scheduled transition is due to their next status and schedules the
/// transition after it.
pub struct HostProgressionSweep {
    progression: DiseaseProgression,
}

impl HostProgressionSweep {
    pub fn new(config: &SimulationConfig) -> Self {
        HostProgressionSweep {
            progression: DiseaseProgression::new(config),
        }
    }
}

impl Sweep for HostProgressionSweep {
    fn name(&self) -> &'static str {
        "host progression"
    }

    fn apply(
        &mut self,
        context: &Context,
        population: &mut Population,
        timestep: Timestep,
    ) -> Result<(), EpiabmError> {
        let mut advanced = 0;
        for cell in population.cells_mut() {
            let due: Vec<usize> = cell
                .people()
                .iter()
                .filter(|person| {
                    person
                        .params()
                        .next_status_time
                        .is_some_and(|time| time <= timestep)
                })
                .map(|person| person.cell_pos())
                .collect();
            for person in due {
                self.progression.advance(context, cell, person, timestep);
                advanced += 1;
            }
        }
        debug!("host progression at timestep {timestep}: {advanced} transitions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{InfectionStatus, PersonAddress, PopulationFactory};
    use crate::random::ContextRandomExt;

    fn setup() -> (Context, Population) {
        let mut context = Context::new();
        context.init_random(5);
        let mut population = PopulationFactory::make_population(1, 1, 3);
        population.initialize();
        (context, population)
    }

    #[test]
    fn advances_only_when_due() {
        let (context, mut population) = setup();
        let cell = population.cell_mut(0);
        cell.update_person_status(0, InfectionStatus::InfectMild, 0);
        let params = cell.person_mut(0).params_mut();
        params.next_status = Some(InfectionStatus::Recovered);
        params.next_status_time = Some(3);

        let mut sweep = HostProgressionSweep::new(&SimulationConfig::default());
        sweep.apply(&context, &mut population, 2).unwrap();
        assert_eq!(population.cell(0).person(0).status(), InfectionStatus::InfectMild);

        sweep.apply(&context, &mut population, 3).unwrap();
        let person = population.cell(0).person(0);
        assert_eq!(person.status(), InfectionStatus::Recovered);
        assert_eq!(person.params().status_change_time, 3);
        assert_eq!(person.params().next_status_time, None);
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Recovered),
            1
        );
    }

    #[test]
    fn overdue_transitions_still_happen() {
        let (context, mut population) = setup();
        let cell = population.cell_mut(0);
        cell.update_person_status(1, InfectionStatus::InfectASympt, 0);
        let params = cell.person_mut(1).params_mut();
        params.next_status = Some(InfectionStatus::Recovered);
        params.next_status_time = Some(1);

        let mut sweep = HostProgressionSweep::new(&SimulationConfig::default());
        sweep.apply(&context, &mut population, 4).unwrap();
        assert_eq!(population.cell(0).person(1).status(), InfectionStatus::Recovered);
    }

    #[test]
    fn isolated_infection_runs_to_completion() {
        let (context, mut population) = setup();
        let config = SimulationConfig::default();
        let progression = DiseaseProgression::new(&config);
        progression.infect(&context, population.cell_mut(0), 2, 0);

        let address = PersonAddress::new(0, 0, 2);
        let mut sweep = HostProgressionSweep::new(&config);
        let mut visited = vec![population.person(address).status()];
        for t in 1..1000 {
            sweep.apply(&context, &mut population, t).unwrap();
            let status = population.person(address).status();
            if visited.last() != Some(&status) {
                visited.push(status);
            }
            if status.is_terminal() {
                break;
            }
        }
        assert_eq!(visited[0], InfectionStatus::Exposed);
        assert!(visited.last().unwrap().is_terminal());
        assert!(visited.len() >= 3);
        // Nobody else was touched
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Susceptible),
            2
        );
    }
}
