use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoStaticStr};

/// The disease compartments a person moves through. Every path starts at `Susceptible` and ends in
/// `Recovered` or `Dead`.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumCount,
    EnumIter,
    IntoStaticStr,
    strum::Display,
)]
pub enum InfectionStatus {
    #[default]
    Susceptible,
    Exposed,
    InfectASympt,
    InfectMild,
    InfectGP,
    InfectHosp,
    InfectICU,
    InfectICURecov,
    Recovered,
    Dead,
}

impl InfectionStatus {
    /// Dense index for per-status arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            InfectionStatus::InfectASympt
                | InfectionStatus::InfectMild
                | InfectionStatus::InfectGP
                | InfectionStatus::InfectHosp
                | InfectionStatus::InfectICU
                | InfectionStatus::InfectICURecov
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, InfectionStatus::Recovered | InfectionStatus::Dead)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}
