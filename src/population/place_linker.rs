use log::{debug, warn};
use rand::seq::index;

use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::{Place, Population};
use crate::random::ContextRandomExt;

define_rng!(PlaceLinkerRng);

/// Creates places and fills them with residents of the microcell they sit in.
pub struct PlaceLinker;

impl PlaceLinker {
    /// Creates `n_places` places, assigned round-robin over every microcell in the population and
    /// located at their cell. Each gets between 1 and `max_place_size` members, drawn uniformly
    /// without replacement from the residents of its microcell. A person may belong to several
    /// places. No place is created in a microcell without residents.
    ///
    /// Returns the number of memberships created.
    pub fn link_places(
        context: &Context,
        population: &mut Population,
        max_place_size: usize,
        n_places: usize,
    ) -> Result<usize, EpiabmError> {
        if max_place_size == 0 {
            return Err(EpiabmError::ConfigError(
                "max_place_size must be at least 1".to_string(),
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

        let mut memberships = 0;
        let mut skipped = 0;
        for p in 0..n_places {
            let (cell_idx, microcell_idx) = microcells[p % microcells.len()];
            let cell = population.cell_mut(cell_idx);
            let location = cell.location();
            let microcell = cell.microcell_mut(microcell_idx);
            let residents = microcell.people().len();
            if residents == 0 {
                skipped += 1;
                continue;
            }

            let size = context
                .sample_range(PlaceLinkerRng, 1..=max_place_size)
                .min(residents);
            let chosen = context.sample(PlaceLinkerRng, |rng| index::sample(rng, residents, size));
            let mut place = Place::new(location);
            for i in chosen.iter() {
                if place.add_member(microcell.people()[i]) {
                    memberships += 1;
                }
            }
            microcell.add_place(place);
        }

        if skipped > 0 {
            warn!("{skipped} of {n_places} places fell in microcells without residents");
        }
        debug!("linked {memberships} place memberships");
        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::PopulationFactory;
    use crate::HashSet;

    fn setup(seed: u64) -> Context {
        let mut context = Context::new();
        context.init_random(seed);
        context
    }

    #[test]
    fn places_hold_local_residents() {
        let context = setup(4);
        let mut population = PopulationFactory::make_population(4, 5, 400);
        let memberships = PlaceLinker::link_places(&context, &mut population, 8, 60).unwrap();

        let mut n_places = 0;
        let mut counted = 0;
        for cell in population.cells() {
            for microcell in cell.microcells() {
                for place in microcell.places() {
                    n_places += 1;
                    assert!((1..=8).contains(&place.members().len()));
                    assert_eq!(place.location(), cell.location());
                    let unique: HashSet<usize> = place.members().iter().copied().collect();
                    assert_eq!(unique.len(), place.members().len());
                    for &person in place.members() {
                        assert_eq!(cell.person(person).microcell(), microcell.cell_pos());
                    }
                    counted += place.members().len();
                }
            }
        }
        assert_eq!(n_places, 60);
        assert_eq!(counted, memberships);
    }

    #[test]
    fn small_microcells_cap_place_size() {
        let context = setup(2);
        let mut population = PopulationFactory::make_population(1, 1, 3);
        PlaceLinker::link_places(&context, &mut population, 50, 10).unwrap();
        let microcell = population.cell(0).microcell(0);
        assert_eq!(microcell.places().len(), 10);
        assert!(microcell.places().iter().all(|place| place.members().len() <= 3));
    }

    #[test]
    fn empty_microcells_get_no_places() {
        let context = setup(2);
        let mut population = PopulationFactory::make_population(2, 1, 0);
        let memberships = PlaceLinker::link_places(&context, &mut population, 5, 4).unwrap();
        assert_eq!(memberships, 0);
        assert!(population
            .cells()
            .iter()
            .all(|cell| cell.microcell(0).places().is_empty()));
    }

    #[test]
    fn zero_max_size_is_an_error() {
        let context = setup(1);
        let mut population = PopulationFactory::make_population(1, 1, 5);
        let result = PlaceLinker::link_places(&context, &mut population, 0, 2);
        assert!(matches!(result, Err(EpiabmError::ConfigError(_))));
    }
}
