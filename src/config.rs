//! Simulation parameters.
//!
//! Everything is loaded from a single JSON document. Every field has a default, so a partial
//! document (or `{}`) is valid:
//!
//! ```json
//! {
//!     "timesteps_per_day": 2,
//!     "infection": { "household_transmission": 0.2, "place_transmission": 0.1 },
//!     "progression": { "mild_period": 6.0 }
//! }
//! ```
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EpiabmError;
use crate::population::InfectionStatus;
use crate::progression::StateTransitionMatrix;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub timesteps_per_day: u32,
    pub infection: InfectionConfig,
    pub progression: ProgressionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            timesteps_per_day: 1,
            infection: InfectionConfig::default(),
            progression: ProgressionConfig::default(),
        }
    }
}

/// Transmission parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfectionConfig {
    /// Baseline per-timestep probability of infection between two members of a household.
    pub household_transmission: f64,
    /// Baseline per-timestep probability of infection between two members of a place.
    pub place_transmission: f64,
    /// Typical number of people an infector mixes with in a place. Divides `place_transmission`.
    pub mean_group_size: f64,
    /// Expected number of spatial infection events caused by one infector per day.
    pub spatial_r0: f64,
    /// Multiplies every infector's spatial infectiousness. Success probabilities above one are
    /// treated as certain infection.
    pub spatial_infectiousness: f64,
    /// How many target cells each infector draws per timestep.
    pub spatial_candidate_cells: usize,
    /// Distance at which the spatial kernel has fallen to one half.
    pub kernel_scale: f64,
    /// How fast the spatial kernel decays beyond `kernel_scale`.
    pub kernel_shape: f64,
    pub asympt_infectiousness: f64,
    pub sympt_infectiousness: f64,
    /// The status seeded infections start in.
    pub initial_status: InfectionStatus,
}

impl Default for InfectionConfig {
    fn default() -> Self {
        InfectionConfig {
            household_transmission: 0.1,
            place_transmission: 0.2,
            mean_group_size: 10.0,
            spatial_r0: 2.4,
            spatial_infectiousness: 1.0,
            spatial_candidate_cells: 5,
            kernel_scale: 1.0,
            kernel_shape: 3.0,
            asympt_infectiousness: 0.5,
            sympt_infectiousness: 1.0,
            initial_status: InfectionStatus::InfectMild,
        }
    }
}

/// Disease progression parameters. Periods are mean durations in days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressionConfig {
    pub latent_period: f64,
    pub asympt_period: f64,
    pub mild_period: f64,
    pub gp_period: f64,
    pub hosp_period: f64,
    pub icu_period: f64,
    pub icu_recov_period: f64,
    pub transition_matrix: StateTransitionMatrix,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        ProgressionConfig {
            latent_period: 4.59,
            asympt_period: 14.0,
            mild_period: 7.0,
            gp_period: 7.0,
            hosp_period: 10.0,
            icu_period: 8.0,
            icu_recov_period: 4.0,
            transition_matrix: StateTransitionMatrix::default(),
        }
    }
}

impl ProgressionConfig {
    /// The mean time, in days, a person spends in `status` before moving on. Zero for statuses
    /// that are left immediately or never.
    pub fn mean_duration(&self, status: InfectionStatus) -> f64 {
        match status {
            InfectionStatus::Exposed => self.latent_period,
            InfectionStatus::InfectASympt => self.asympt_period,
            InfectionStatus::InfectMild => self.mild_period,
            InfectionStatus::InfectGP => self.gp_period,
            InfectionStatus::InfectHosp => self.hosp_period,
            InfectionStatus::InfectICU => self.icu_period,
            InfectionStatus::InfectICURecov => self.icu_recov_period,
            InfectionStatus::Susceptible | InfectionStatus::Recovered | InfectionStatus::Dead => {
                0.0
            }
        }
    }
}

impl SimulationConfig {
    /// Loads and validates a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, EpiabmError> {
        let file = File::open(path)?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, EpiabmError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values the timestep loop relies on.
    pub fn validate(&self) -> Result<(), EpiabmError> {
        if self.timesteps_per_day == 0 {
            return Err(config_error("timesteps_per_day must be positive"));
        }

        let infection = &self.infection;
        check_probability("household_transmission", infection.household_transmission)?;
        check_probability("place_transmission", infection.place_transmission)?;
        for (name, value) in [
            ("spatial_r0", infection.spatial_r0),
            ("spatial_infectiousness", infection.spatial_infectiousness),
            ("asympt_infectiousness", infection.asympt_infectiousness),
            ("sympt_infectiousness", infection.sympt_infectiousness),
            ("kernel_shape", infection.kernel_shape),
        ] {
            check_non_negative(name, value)?;
        }
        if infection.kernel_scale.is_nan() || infection.kernel_scale <= 0.0 {
            return Err(config_error("kernel_scale must be positive"));
        }
        if infection.mean_group_size.is_nan() || infection.mean_group_size <= 0.0 {
            return Err(config_error("mean_group_size must be positive"));
        }
        let initial = infection.initial_status;
        if !initial.is_infectious() {
            return Err(config_error(&format!(
                "initial_status {initial} is not an infectious status"
            )));
        }

        let progression = &self.progression;
        for (name, value) in [
            ("latent_period", progression.latent_period),
            ("asympt_period", progression.asympt_period),
            ("mild_period", progression.mild_period),
            ("gp_period", progression.gp_period),
            ("hosp_period", progression.hosp_period),
            ("icu_period", progression.icu_period),
            ("icu_recov_period", progression.icu_recov_period),
        ] {
            check_non_negative(name, value)?;
        }
        progression.transition_matrix.validate()
    }
}

fn config_error(msg: &str) -> EpiabmError {
    EpiabmError::ConfigError(msg.to_string())
}

fn check_probability(name: &str, value: f64) -> Result<(), EpiabmError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(config_error(&format!(
            "{name} must be a probability within [0, 1], got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), EpiabmError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(config_error(&format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}
