use crate::error::EpiabmError;
use crate::population::{InfectionStatus, Timestep};

/// Per-person epidemiological parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonParams {
    /// Multiplies the person's force of infection on others. Zero while not infectious.
    pub infectiousness: f64,
    /// Multiplies the force of infection acting on the person.
    pub susceptibility: f64,
    /// The status the person moves to at `next_status_time`.
    pub next_status: Option<InfectionStatus>,
    /// The timestep of the next scheduled transition, if any.
    pub next_status_time: Option<Timestep>,
    /// The timestep of the most recent status change.
    pub status_change_time: Timestep,
    /// The timestep the person became infectious; cleared on recovery or death.
    pub infection_start_time: Option<Timestep>,
}

impl Default for PersonParams {
    fn default() -> Self {
        PersonParams {
            infectiousness: 0.0,
            susceptibility: 1.0,
            next_status: None,
            next_status_time: None,
            status_change_time: 0,
            infection_start_time: None,
        }
    }
}

/// An agent. Owned by value by its [`Cell`](crate::population::Cell); everything else refers to
/// it by its index in the cell.
#[derive(Clone, Debug)]
pub struct Person {
    status: InfectionStatus,
    cell_pos: usize,
    microcell: usize,
    microcell_pos: usize,
    household: Option<usize>,
    params: PersonParams,
}

impl Person {
    pub fn new(microcell: usize, cell_pos: usize, microcell_pos: usize) -> Self {
        Person {
            status: InfectionStatus::Susceptible,
            cell_pos,
            microcell,
            microcell_pos,
            household: None,
            params: PersonParams::default(),
        }
    }

    pub fn status(&self) -> InfectionStatus {
        self.status
    }

    /// Index of this person in the owning cell's person vector.
    pub fn cell_pos(&self) -> usize {
        self.cell_pos
    }

    /// Index of the person's microcell within the owning cell.
    pub fn microcell(&self) -> usize {
        self.microcell
    }

    /// Index of this person in the microcell's person list.
    pub fn microcell_pos(&self) -> usize {
        self.microcell_pos
    }

    pub fn household(&self) -> Option<usize> {
        self.household
    }

    /// Assigns the person to a household within their microcell. Membership is immutable: only the
    /// first call succeeds, later calls return an error and keep the original household.
    pub fn set_household(&mut self, household: usize) -> Result<(), EpiabmError> {
        match self.household {
            Some(existing) => Err(EpiabmError::HouseholdAlreadyAssigned { existing }),
            None => {
                self.household = Some(household);
                Ok(())
            }
        }
    }

    pub fn params(&self) -> &PersonParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PersonParams {
        &mut self.params
    }

    pub fn is_infectious(&self) -> bool {
        self.status.is_infectious()
    }

    pub fn is_susceptible(&self) -> bool {
        self.status == InfectionStatus::Susceptible
    }

    // Only `Cell::update_person_status` may call this; it keeps the compartment counter in step.
    pub(crate) fn set_status(&mut self, status: InfectionStatus, timestep: Timestep) {
        self.status = status;
        self.params.status_change_time = timestep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_person() {
        let person = Person::new(0, 5, 10);
        assert_eq!(person.cell_pos(), 5);
        assert_eq!(person.microcell_pos(), 10);
        assert_eq!(person.microcell(), 0);
        assert_eq!(person.status(), InfectionStatus::Susceptible);
        assert_eq!(person.household(), None);
        assert_eq!(person.params(), &PersonParams::default());
    }

    #[test]
    fn set_household_only_once() {
        let mut person = Person::new(0, 0, 0);
        assert!(person.set_household(4).is_ok());
        match person.set_household(5) {
            Err(EpiabmError::HouseholdAlreadyAssigned { existing }) => assert_eq!(existing, 4),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(person.set_household(4).is_err());
        assert_eq!(person.household(), Some(4));
    }

    #[test]
    fn set_status_records_time() {
        let mut person = Person::new(0, 0, 0);
        person.set_status(InfectionStatus::Exposed, 3);
        assert_eq!(person.status(), InfectionStatus::Exposed);
        assert_eq!(person.params().status_change_time, 3);
        assert!(!person.is_infectious());
        assert!(!person.is_susceptible());
    }
}
