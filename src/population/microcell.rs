use crate::population::{
    CompartmentCounter, Household, InfectionStatus, Person, Place, Timestep,
};

/// A spatial subdivision of a [`Cell`](crate::population::Cell).
///
/// A microcell lists its residents by their index in the owning cell's person vector and owns
/// the places and households located in it. Every index it holds must be valid in that cell.
#[derive(Clone, Debug)]
pub struct Microcell {
    people: Vec<usize>,
    places: Vec<Place>,
    households: Vec<Household>,
    cell_pos: usize,
    compartment_counter: CompartmentCounter,
}

impl Microcell {
    pub fn new(cell_pos: usize) -> Self {
        Microcell {
            people: Vec::new(),
            places: Vec::new(),
            households: Vec::new(),
            cell_pos,
            compartment_counter: CompartmentCounter::new(),
        }
    }

    /// Index of this microcell in the owning cell.
    pub fn cell_pos(&self) -> usize {
        self.cell_pos
    }

    /// Cell-level indices of the residents.
    pub fn people(&self) -> &[usize] {
        &self.people
    }

    pub(crate) fn push_person(&mut self, person: usize) -> usize {
        self.people.push(person);
        self.people.len() - 1
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn places_mut(&mut self) -> &mut [Place] {
        &mut self.places
    }

    /// Adds a place and returns its index in this microcell.
    pub fn add_place(&mut self, place: Place) -> usize {
        self.places.push(place);
        self.places.len() - 1
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    pub fn households_mut(&mut self) -> &mut [Household] {
        &mut self.households
    }

    /// Adds an empty household and returns its index in this microcell.
    pub fn add_household(&mut self) -> usize {
        let idx = self.households.len();
        self.households.push(Household::new(idx));
        idx
    }

    /// Calls `callback` on each resident in list order until it returns `false`. The stopping
    /// call is the last one made.
    pub fn for_each_person<F>(&self, people: &[Person], mut callback: F)
    where
        F: FnMut(&Person) -> bool,
    {
        for &index in &self.people {
            if !callback(&people[index]) {
                return;
            }
        }
    }

    /// Calls `callback` on each place in order until it returns `false`.
    pub fn for_each_place<F>(&self, mut callback: F)
    where
        F: FnMut(&Place) -> bool,
    {
        for place in &self.places {
            if !callback(place) {
                return;
            }
        }
    }

    /// The `i`-th resident of this microcell.
    pub fn get_person<'a>(&self, people: &'a [Person], i: usize) -> &'a Person {
        &people[self.people[i]]
    }

    /// Rebuilds the compartment counter from the residents' current statuses.
    pub fn initialize(&mut self, people: &[Person]) {
        self.compartment_counter.initialize(people, &self.people);
    }

    /// Records that `person`, a resident, is about to change to `new_status`.
    pub fn person_status_change(
        &mut self,
        person: &Person,
        new_status: InfectionStatus,
        _timestep: Timestep,
    ) {
        self.compartment_counter.notify(person.status(), new_status);
    }

    pub fn compartment_counter(&self) -> &CompartmentCounter {
        &self.compartment_counter
    }
}
