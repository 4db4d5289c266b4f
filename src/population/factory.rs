use log::debug;

use crate::population::Population;

/// Builds uniformly distributed populations.
pub struct PopulationFactory;

impl PopulationFactory {
    /// Creates `n_cells` cells of `n_microcells_per_cell` microcells each and spreads `n_people`
    /// susceptible people as evenly as possible, first over cells and then over each cell's
    /// microcells. Cells are laid out on the smallest square grid that holds them, at
    /// `(column, row)`.
    ///
    /// The population is returned uninitialized so callers can still link households.
    pub fn make_population(
        n_cells: usize,
        n_microcells_per_cell: usize,
        n_people: usize,
    ) -> Population {
        assert!(
            n_people == 0 || n_cells * n_microcells_per_cell > 0,
            "cannot place {n_people} people in a population without microcells"
        );

        let mut population = Population::new();
        let side = grid_side(n_cells);
        for i in 0..n_cells {
            #[allow(clippy::cast_precision_loss)]
            let location = ((i % side) as f64, (i / side) as f64);
            let cell_idx = population.add_cell(location);
            let cell = population.cell_mut(cell_idx);
            for _ in 0..n_microcells_per_cell {
                cell.add_microcell();
            }

            let in_cell = share(n_people, n_cells, i);
            for j in 0..n_microcells_per_cell {
                for _ in 0..share(in_cell, n_microcells_per_cell, j) {
                    cell.add_person(j);
                }
            }
        }
        debug!(
            "made population of {} people in {n_cells} cells",
            population.total_people()
        );
        population
    }
}

/// The `i`-th of `parts` near-equal shares of `total`. The first `total % parts` shares get one
/// extra.
fn share(total: usize, parts: usize, i: usize) -> usize {
    total / parts + usize::from(i < total % parts)
}

fn grid_side(n_cells: usize) -> usize {
    let mut side = 1;
    while side * side < n_cells {
        side += 1;
    }
    side
}
