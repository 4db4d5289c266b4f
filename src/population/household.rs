//! Groups of co-located people within a microcell. Both hold person indices into the owning cell,
//! never the people themselves.

/// A household. Transmission between its members is modelled by the
/// [`HouseholdSweep`](crate::sweep::HouseholdSweep).
#[derive(Clone, Debug)]
pub struct Household {
    microcell_pos: usize,
    members: Vec<usize>,
    infectiousness: f64,
    susceptibility: f64,
}

impl Household {
    pub fn new(microcell_pos: usize) -> Self {
        Household {
            microcell_pos,
            members: Vec::new(),
            infectiousness: 1.0,
            susceptibility: 1.0,
        }
    }

    /// Index of this household in its microcell's household list.
    pub fn microcell_pos(&self) -> usize {
        self.microcell_pos
    }

    /// Cell-level person indices of the members, in the order they were added.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub(crate) fn add_member(&mut self, person: usize) {
        self.members.push(person);
    }

    pub fn infectiousness(&self) -> f64 {
        self.infectiousness
    }

    pub fn susceptibility(&self) -> f64 {
        self.susceptibility
    }

    pub fn set_infectiousness(&mut self, infectiousness: f64) {
        self.infectiousness = infectiousness;
    }

    pub fn set_susceptibility(&mut self, susceptibility: f64) {
        self.susceptibility = susceptibility;
    }
}

/// A location people visit, such as a school or workplace. Transmission between its members is
/// modelled by the [`PlaceSweep`](crate::sweep::PlaceSweep).
#[derive(Clone, Debug)]
pub struct Place {
    location: (f64, f64),
    members: Vec<usize>,
}

impl Place {
    pub fn new(location: (f64, f64)) -> Self {
        Place {
            location,
            members: Vec::new(),
        }
    }

    pub fn location(&self) -> (f64, f64) {
        self.location
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Adds a cell-level person index. A person is listed at most once.
    pub fn add_member(&mut self, person: usize) -> bool {
        if self.members.contains(&person) {
            false
        } else {
            self.members.push(person);
            true
        }
    }
}
