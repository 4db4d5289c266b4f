//! Incremental per-scope tally of people by infection status.
//!
//! Counts are built once from scratch by [`CompartmentCounter::initialize`] and afterwards only
//! change through [`CompartmentCounter::notify`], which every status mutation calls exactly once.
//! Counters do not cascade: a cell or population total is an explicit sum of microcell counters.

use std::ops::{AddAssign, Index};

use strum::{EnumCount, IntoEnumIterator};

use crate::population::{InfectionStatus, Person};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompartmentCounter {
    counts: [usize; InfectionStatus::COUNT],
}

impl CompartmentCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the counts for the people at `indices` in `people`.
    pub fn initialize(&mut self, people: &[Person], indices: &[usize]) {
        self.counts = [0; InfectionStatus::COUNT];
        for &index in indices {
            self.counts[people[index].status().index()] += 1;
        }
    }

    /// Moves one person from `old_status` to `new_status`.
    pub fn notify(&mut self, old_status: InfectionStatus, new_status: InfectionStatus) {
        if old_status == new_status {
            return;
        }
        debug_assert!(
            self.counts[old_status.index()] > 0,
            "status change from an empty compartment {old_status}"
        );
        self.counts[old_status.index()] -= 1;
        self.counts[new_status.index()] += 1;
    }

    pub fn count(&self, status: InfectionStatus) -> usize {
        self.counts[status.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn number_infectious(&self) -> usize {
        self.iter()
            .filter(|(status, _)| status.is_infectious())
            .map(|(_, count)| count)
            .sum()
    }

    /// Iterates over `(status, count)` pairs in status order.
    pub fn iter(&self) -> impl Iterator<Item = (InfectionStatus, usize)> + '_ {
        InfectionStatus::iter().map(|status| (status, self.counts[status.index()]))
    }
}

impl Index<InfectionStatus> for CompartmentCounter {
    type Output = usize;

    fn index(&self, status: InfectionStatus) -> &Self::Output {
        &self.counts[status.index()]
    }
}

impl AddAssign<&CompartmentCounter> for CompartmentCounter {
    fn add_assign(&mut self, other: &CompartmentCounter) {
        for (count, other_count) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += other_count;
        }
    }
}
