use log::{info, warn};
use rand::seq::index;

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::{InfectionStatus, PersonAddress, Population, Timestep};
use crate::progression::DiseaseProgression;
use crate::random::ContextRandomExt;
use crate::sweep::Sweep;

define_rng!(RandomSeedRng);

/// Seeds the initial infections.
///
/// The first call moves `n_infections` distinct susceptible people, chosen uniformly from the whole
/// population, to the configured initial status. Later calls do nothing.
pub struct RandomSeedSweep {
    n_infections: usize,
    initial_status: InfectionStatus,
    progression: DiseaseProgression,
    done: bool,
}

impl RandomSeedSweep {
    pub fn new(config: &SimulationConfig, n_infections: usize) -> Self {
        RandomSeedSweep {
            n_infections,
            initial_status: config.infection.initial_status,
            progression: DiseaseProgression::new(config),
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Sweep for RandomSeedSweep {
    fn name(&self) -> &'static str {
        "random seed"
    }

    fn apply(
        &mut self,
        context: &Context,
        population: &mut Population,
        timestep: Timestep,
    ) -> Result<(), EpiabmError> {
        if self.done {
            return Ok(());
        }
        self.done = true;

        let susceptible: Vec<PersonAddress> = population
            .addresses()
            .filter(|&address| population.person(address).is_susceptible())
            .collect();
        let n = if susceptible.len() < self.n_infections {
            warn!(
                "asked to seed {} infections but only {} people are susceptible",
                self.n_infections,
                susceptible.len()
            );
            susceptible.len()
        } else {
            self.n_infections
        };

        let chosen = context.sample(RandomSeedRng, |rng| index::sample(rng, susceptible.len(), n));
        for i in chosen.iter() {
            let address = susceptible[i];
            self.progression.set_status(
                context,
                population.cell_mut(address.cell),
                address.person,
                self.initial_status,
                timestep,
            );
        }
        info!("seeded {n} infections as {}", self.initial_status);
        Ok(())
    }
}
