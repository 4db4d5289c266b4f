//! Per-timestep update operators.
//!
//! The [`Simulation`](crate::simulation::Simulation) calls [`Sweep::bind_population`] once per run
//! and then [`Sweep::apply`] once per timestep. Transmission sweeps read the population first and
//! collect new infections in a pending list, which is applied only after the read phase so that
//! every read in a pass sees the statuses from before the pass.
mod host_progression_sweep;
mod household_sweep;
mod place_sweep;
mod random_seed_sweep;
mod spatial_sweep;

pub use host_progression_sweep::HostProgressionSweep;
pub use household_sweep::HouseholdSweep;
pub use place_sweep::PlaceSweep;
pub use random_seed_sweep::RandomSeedSweep;
pub use spatial_sweep::SpatialSweep;

use crate::context::Context;
use crate::error::EpiabmError;
use crate::population::{PersonAddress, Population, Timestep};
use crate::progression::DiseaseProgression;

pub trait Sweep {
    /// A short name used in log messages.
    fn name(&self) -> &'static str;

    /// Precomputes anything derived from the population's structure. Called before the first
    /// timestep of every run.
    fn bind_population(&mut self, _population: &Population) {}

    /// Applies this sweep's effect for `timestep`.
    fn apply(
        &mut self,
        context: &Context,
        population: &mut Population,
        timestep: Timestep,
    ) -> Result<(), EpiabmError>;
}

/// Infects every queued person who is still susceptible and returns how many were infected. A
/// person queued more than once is only infected the first time.
pub(crate) fn apply_infections(
    context: &Context,
    population: &mut Population,
    progression: &DiseaseProgression,
    pending: &[PersonAddress],
    timestep: Timestep,
) -> usize {
    let mut infected = 0;
    for address in pending {
        let cell = population.cell_mut(address.cell);
        if cell.person(address.person).is_susceptible() {
            progression.infect(context, cell, address.person, timestep);
            infected += 1;
        }
    }
    infected
}
