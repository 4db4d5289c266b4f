//! The agent data model.
//!
//! A [`Population`] owns its [`Cell`]s, each cell owns its [`Person`]s and [`Microcell`]s, and each
//! microcell owns its [`Household`]s and [`Place`]s. Every other relation is a plain index into the
//! owning container, so the hierarchy is a tree of vectors and nothing is reference counted.
//! Containers are sized during assembly and never resized once the simulation starts.
mod cell;
mod compartment_counter;
mod factory;
mod household;
mod household_linker;
mod infection_status;
mod microcell;
mod person;
mod place_linker;

pub use cell::Cell;
pub use compartment_counter::CompartmentCounter;
pub use factory::PopulationFactory;
pub use household::{Household, Place};
pub use household_linker::HouseholdLinker;
pub use infection_status::InfectionStatus;
pub use microcell::Microcell;
pub use person::{Person, PersonParams};
pub use place_linker::PlaceLinker;

/// A discrete simulation step. Timestep 0 is the state before the first sweep runs.
pub type Timestep = u32;

/// The fully qualified location of a person.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonAddress {
    pub cell: usize,
    pub microcell: usize,
    /// Index of the person in the cell's person vector.
    pub person: usize,
}

impl PersonAddress {
    pub fn new(cell: usize, microcell: usize, person: usize) -> Self {
        PersonAddress {
            cell,
            microcell,
            person,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Population {
    cells: Vec<Cell>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty cell at `location` and returns its index.
    pub fn add_cell(&mut self, location: (f64, f64)) -> usize {
        let idx = self.cells.len();
        self.cells.push(Cell::with_location(idx, location));
        idx
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Calls `callback` on each cell in order until it returns `false`.
    pub fn for_each_cell<F>(&self, mut callback: F)
    where
        F: FnMut(&Cell) -> bool,
    {
        for cell in &self.cells {
            if !callback(cell) {
                return;
            }
        }
    }

    /// Rebuilds every compartment counter from the current statuses. Must be called after
    /// assembly and before any sweep runs.
    pub fn initialize(&mut self) {
        for cell in &mut self.cells {
            cell.initialize();
        }
    }

    pub fn person(&self, address: PersonAddress) -> &Person {
        self.cells[address.cell].person(address.person)
    }

    /// Changes the status of the person at `address`, keeping the counters in step.
    pub fn update_person_status(
        &mut self,
        address: PersonAddress,
        new_status: InfectionStatus,
        timestep: Timestep,
    ) {
        self.cells[address.cell].update_person_status(address.person, new_status, timestep);
    }

    /// Addresses of every person, cell by cell in index order.
    pub fn addresses(&self) -> impl Iterator<Item = PersonAddress> + '_ {
        self.cells.iter().flat_map(|cell| {
            cell.people()
                .iter()
                .map(move |person| PersonAddress::new(cell.index(), person.microcell(), person.cell_pos()))
        })
    }

    pub fn total_people(&self) -> usize {
        self.cells.iter().map(|cell| cell.people().len()).sum()
    }

    /// The sum of every microcell counter.
    pub fn compartment_counter(&self) -> CompartmentCounter {
        let mut total = CompartmentCounter::new();
        for cell in &self.cells {
            for microcell in cell.microcells() {
                total += microcell.compartment_counter();
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_population() -> Population {
        let mut population = Population::new();
        for i in 0..3 {
            let cell = population.add_cell((f64::from(i), 0.0));
            let cell = population.cell_mut(cell);
            let microcell = cell.add_microcell();
            for _ in 0..=i {
                cell.add_person(microcell);
            }
        }
        population.initialize();
        population
    }

    #[test]
    fn totals() {
        let population = small_population();
        assert_eq!(population.cells().len(), 3);
        assert_eq!(population.total_people(), 6);
        assert_eq!(population.compartment_counter().total(), 6);
        assert_eq!(
            population.compartment_counter().count(InfectionStatus::Susceptible),
            6
        );
    }

    #[test]
    fn addresses_cover_everyone() {
        let population = small_population();
        let addresses: Vec<_> = population.addresses().collect();
        assert_eq!(addresses.len(), 6);
        assert_eq!(addresses[0], PersonAddress::new(0, 0, 0));
        assert_eq!(addresses[5], PersonAddress::new(2, 0, 2));
        for address in addresses {
            assert_eq!(population.person(address).cell_pos(), address.person);
        }
    }

    #[test]
    fn update_status_through_population() {
        let mut population = small_population();
        let address = PersonAddress::new(2, 0, 1);
        population.update_person_status(address, InfectionStatus::Exposed, 4);
        assert_eq!(population.person(address).status(), InfectionStatus::Exposed);
        let counter = population.compartment_counter();
        assert_eq!(counter.count(InfectionStatus::Exposed), 1);
        assert_eq!(counter.total(), 6);
    }

    #[test]
    fn for_each_cell_early_stop() {
        let population = small_population();
        let mut visited = Vec::new();
        population.for_each_cell(|cell| {
            visited.push(cell.index());
            cell.index() < 1
        });
        assert_eq!(visited, vec![0, 1]);
    }
}
