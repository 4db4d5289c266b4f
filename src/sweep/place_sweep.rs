use log::debug;

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::{Cell, Person, PersonAddress, Place, Population, Timestep};
use crate::progression::DiseaseProgression;
use crate::random::ContextRandomExt;
use crate::sweep::{apply_infections, Sweep};

define_rng!(PlaceSweepRng);

/// Transmission between people who share a place.
///
/// Each infectious member tries once per timestep to infect every susceptible member of the same
/// place, succeeding with probability `place_inf(infector) * place_susc(infectee)`.
pub struct PlaceSweep {
    place_transmission: f64,
    mean_group_size: f64,
    progression: DiseaseProgression,
}

impl PlaceSweep {
    pub fn new(config: &SimulationConfig) -> Self {
        PlaceSweep {
            place_transmission: config.infection.place_transmission,
            mean_group_size: config.infection.mean_group_size,
            progression: DiseaseProgression::new(config),
        }
    }

    /// The place transmission rate shared across a typical group, times the infector's
    /// infectiousness.
    pub fn place_inf(&self, infector: &Person, _place: &Place) -> f64 {
        self.place_transmission / self.mean_group_size * infector.params().infectiousness
    }

    pub fn place_susc(&self, infectee: &Person, _place: &Place) -> f64 {
        infectee.params().susceptibility
    }

    fn collect_infections(&self, context: &Context, cell: &Cell, pending: &mut Vec<PersonAddress>) {
        for microcell in cell.microcells() {
            microcell.for_each_place(|place| {
                for &infector in place.members() {
                    let infector = cell.person(infector);
                    if !infector.is_infectious() {
                        continue;
                    }
                    let inf = self.place_inf(infector, place);
                    for &infectee in place.members() {
                        let infectee = cell.person(infectee);
                        if !infectee.is_susceptible() {
                            continue;
                        }
                        let probability = inf * self.place_susc(infectee, place);
                        if context.sample_bool(PlaceSweepRng, probability.clamp(0.0, 1.0)) {
                            pending.push(PersonAddress::new(
                                cell.index(),
                                infectee.microcell(),
                                infectee.cell_pos(),
                            ));
                        }
                    }
                }
                true
            });
        }
    }
}

impl Sweep for PlaceSweep {
    fn name(&self) -> &'static str {
        "place"
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
        debug!("place sweep at timestep {timestep}: {infected} new infections");
        Ok(())
    }
}
