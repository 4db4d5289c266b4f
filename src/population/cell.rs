use crate::error::EpiabmError;
use crate::population::{
    CompartmentCounter, Household, InfectionStatus, Microcell, Person, Timestep,
};

/// A spatial unit of the population. The cell owns its people; its microcells partition them by
/// index.
#[derive(Clone, Debug)]
pub struct Cell {
    index: usize,
    location: (f64, f64),
    people: Vec<Person>,
    microcells: Vec<Microcell>,
}

impl Cell {
    pub fn new(index: usize) -> Self {
        Self::with_location(index, (0.0, 0.0))
    }

    pub fn with_location(index: usize, location: (f64, f64)) -> Self {
        Cell {
            index,
            location,
            people: Vec::new(),
            microcells: Vec::new(),
        }
    }

    /// Index of this cell in the population.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn location(&self) -> (f64, f64) {
        self.location
    }

    pub fn set_location(&mut self, location: (f64, f64)) {
        self.location = location;
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, index: usize) -> &Person {
        &self.people[index]
    }

    /// Mutable access to a person's parameters and household. Status changes must go through
    /// [`Cell::update_person_status`].
    pub fn person_mut(&mut self, index: usize) -> &mut Person {
        &mut self.people[index]
    }

    pub fn microcells(&self) -> &[Microcell] {
        &self.microcells
    }

    pub fn microcell(&self, index: usize) -> &Microcell {
        &self.microcells[index]
    }

    pub fn microcell_mut(&mut self, index: usize) -> &mut Microcell {
        &mut self.microcells[index]
    }

    /// Adds an empty microcell and returns its index.
    pub fn add_microcell(&mut self) -> usize {
        let idx = self.microcells.len();
        self.microcells.push(Microcell::new(idx));
        idx
    }

    /// Adds a susceptible person to the given microcell and returns their index in this cell.
    pub fn add_person(&mut self, microcell: usize) -> usize {
        let cell_pos = self.people.len();
        let microcell_pos = self.microcells[microcell].push_person(cell_pos);
        self.people.push(Person::new(microcell, cell_pos, microcell_pos));
        cell_pos
    }

    /// Adds a person to a household in the person's own microcell. Fails, changing nothing, if the
    /// person already belongs to a household.
    pub fn add_person_to_household(
        &mut self,
        person: usize,
        household: usize,
    ) -> Result<(), EpiabmError> {
        let resident = &mut self.people[person];
        let microcell = &mut self.microcells[resident.microcell()];
        assert!(
            household < microcell.households().len(),
            "household {household} does not exist in microcell {}",
            microcell.cell_pos()
        );
        resident.set_household(household)?;
        microcell.households_mut()[household].add_member(person);
        Ok(())
    }

    /// The household of the given person, if they have one.
    pub fn household_of(&self, person: usize) -> Option<&Household> {
        let person = &self.people[person];
        person
            .household()
            .map(|household| &self.microcells[person.microcell()].households()[household])
    }

    /// Rebuilds every microcell's compartment counter from the current statuses.
    pub fn initialize(&mut self) {
        for microcell in &mut self.microcells {
            microcell.initialize(&self.people);
        }
    }

    /// Changes a person's status, notifying their microcell first so its counter stays in step.
    pub fn update_person_status(
        &mut self,
        person: usize,
        new_status: InfectionStatus,
        timestep: Timestep,
    ) {
        let person = &mut self.people[person];
        self.microcells[person.microcell()].person_status_change(person, new_status, timestep);
        person.set_status(new_status, timestep);
    }

    /// Calls `callback` on each person in index order until it returns `false`.
    pub fn for_each_person<F>(&self, mut callback: F)
    where
        F: FnMut(&Person) -> bool,
    {
        for person in &self.people {
            if !callback(person) {
                return;
            }
        }
    }

    /// Calls `callback` on each resident of one microcell until it returns `false`.
    pub fn for_each_microcell_person<F>(&self, microcell: usize, callback: F)
    where
        F: FnMut(&Person) -> bool,
    {
        self.microcells[microcell].for_each_person(&self.people, callback);
    }

    /// The sum of the microcell counters.
    pub fn compartment_counter(&self) -> CompartmentCounter {
        let mut total = CompartmentCounter::new();
        for microcell in &self.microcells {
            total += microcell.compartment_counter();
        }
        total
    }

    pub fn number_infectious(&self) -> usize {
        self.microcells
            .iter()
            .map(|microcell| microcell.compartment_counter().number_infectious())
            .sum()
    }
}
