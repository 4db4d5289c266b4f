use log::{debug, warn};
use rand::seq::index;

use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::Population;
use crate::random::ContextRandomExt;

define_rng!(HouseholdLinkerRng);

/// Groups the residents of each microcell into households.
pub struct HouseholdLinker;

impl HouseholdLinker {
    /// Creates `n_households` households, assigned round-robin over every microcell in the
    /// population. Each gets between 1 and `max_household_size` members, drawn uniformly without
    /// replacement from the residents of its microcell who are not in a household yet. A household
    /// whose microcell has no such resident left is not created.
    ///
    /// Returns the number of people linked.
    pub fn link_households(
        context: &Context,
        population: &mut Population,
        max_household_size: usize,
        n_households: usize,
    ) -> Result<usize, EpiabmError> {
        if max_household_size == 0 {
            return Err(EpiabmError::ConfigError(
                "max_household_size must be at least 1".to_string(),
            ));
        }

        let microcells: Vec<(usize, usize)> = population
            .cells()
            .iter()
            .flat_map(|cell| (0..cell.microcells().len()).map(move |m| (cell.index(), m)))
            .collect();
        if microcells.is_empty() {
            return Ok(0);
        }

        let mut linked = 0;
        let mut skipped = 0;
        for h in 0..n_households {
            let (cell_idx, microcell_idx) = microcells[h % microcells.len()];
            let cell = population.cell_mut(cell_idx);
            let unhoused: Vec<usize> = cell
                .microcell(microcell_idx)
                .people()
                .iter()
                .copied()
                .filter(|&person| cell.person(person).household().is_none())
                .collect();
            if unhoused.is_empty() {
                skipped += 1;
                continue;
            }

            let size = context
                .sample_range(HouseholdLinkerRng, 1..=max_household_size)
                .min(unhoused.len());
            let chosen = context.sample(HouseholdLinkerRng, |rng| {
                index::sample(rng, unhoused.len(), size)
            });
            let household = cell.microcell_mut(microcell_idx).add_household();
            for i in chosen.iter() {
                cell.add_person_to_household(unhoused[i], household)?;
                linked += 1;
            }
        }

        if skipped > 0 {
            warn!("{skipped} of {n_households} households had no residents left to link");
        }
        debug!("linked {linked} people into households");
        Ok(linked)
    }
}
