//! Disease progression rules shared by every sweep that changes a person's status.
//!
//! A person's next status is drawn from the row of the [`StateTransitionMatrix`] for their current
//! status, and the time until that transition is drawn from an exponential [`InverseCdf`] with the
//! configured mean duration of the current status.
use std::collections::BTreeMap;

use log::trace;
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

use crate::config::{ProgressionConfig, SimulationConfig};
use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::inverse_cdf::InverseCdf;
use crate::population::{Cell, InfectionStatus, Person, Timestep};
use crate::random::ContextRandomExt;

define_rng!(ProgressionRng);

const N_STATUSES: usize = InfectionStatus::COUNT;

type TransitionTable = BTreeMap<InfectionStatus, BTreeMap<InfectionStatus, f64>>;

/// Probabilities of moving from one status (row) to another (column).
///
/// Serialized as a nested map that lists only the non-zero entries, e.g.
/// `{"InfectGP": {"Recovered": 0.9, "InfectHosp": 0.1}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransitionTable", into = "TransitionTable")]
pub struct StateTransitionMatrix {
    probabilities: [[f64; N_STATUSES]; N_STATUSES],
}

impl StateTransitionMatrix {
    /// A matrix with every probability zero.
    pub fn zeros() -> Self {
        StateTransitionMatrix {
            probabilities: [[0.0; N_STATUSES]; N_STATUSES],
        }
    }

    pub fn probability(&self, from: InfectionStatus, to: InfectionStatus) -> f64 {
        self.probabilities[from.index()][to.index()]
    }

    pub fn set_probability(
        &mut self,
        from: InfectionStatus,
        to: InfectionStatus,
        probability: f64,
    ) -> Result<(), EpiabmError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(EpiabmError::ConfigError(format!(
                "transition probability {from} -> {to} must be within [0, 1], got {probability}"
            )));
        }
        self.probabilities[from.index()][to.index()] = probability;
        Ok(())
    }

    /// The transition weights out of `from`, indexed by status.
    pub fn row(&self, from: InfectionStatus) -> &[f64; N_STATUSES] {
        &self.probabilities[from.index()]
    }

    /// Every row of a status that can be left must sum to one.
    pub fn validate(&self) -> Result<(), EpiabmError> {
        for status in InfectionStatus::iter().filter(|status| !status.is_terminal()) {
            let total: f64 = self.row(status).iter().sum();
            if (total - 1.0).abs() > 1e-6 {
                return Err(EpiabmError::ConfigError(format!(
                    "transition probabilities out of {status} sum to {total}, not 1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StateTransitionMatrix {
    fn default() -> Self {
        use InfectionStatus::*;

        let mut matrix = StateTransitionMatrix::zeros();
        for (from, to, p) in [
            (Susceptible, Exposed, 1.0),
            (Exposed, InfectASympt, 0.34),
            (Exposed, InfectMild, 0.421_934_671_460_28),
            (Exposed, InfectGP, 0.238_065_328_539_72),
            (InfectASympt, Recovered, 1.0),
            (InfectMild, Recovered, 1.0),
            (InfectGP, Recovered, 0.895_740_672_655_537_7),
            (InfectGP, InfectHosp, 0.104_259_327_344_462_3),
            (InfectHosp, Recovered, 0.607_853_455_780_578_9),
            (InfectHosp, InfectICU, 0.195_553_525_650_872_6),
            (InfectHosp, Dead, 0.196_593_018_568_548_5),
            (InfectICU, InfectICURecov, 0.476_510_4),
            (InfectICU, Dead, 0.523_489_6),
            (InfectICURecov, Recovered, 1.0),
            (Recovered, Recovered, 1.0),
            (Dead, Dead, 1.0),
        ] {
            matrix.probabilities[from.index()][to.index()] = p;
        }
        matrix
    }
}

impl TryFrom<TransitionTable> for StateTransitionMatrix {
    type Error = EpiabmError;

    fn try_from(table: TransitionTable) -> Result<Self, Self::Error> {
        let mut matrix = StateTransitionMatrix::zeros();
        for (from, row) in table {
            for (to, probability) in row {
                matrix.set_probability(from, to, probability)?;
            }
        }
        Ok(matrix)
    }
}

impl From<StateTransitionMatrix> for TransitionTable {
    fn from(matrix: StateTransitionMatrix) -> Self {
        let mut table = TransitionTable::new();
        for from in InfectionStatus::iter() {
            for to in InfectionStatus::iter() {
                let probability = matrix.probability(from, to);
                if probability != 0.0 {
                    table.entry(from).or_default().insert(to, probability);
                }
            }
        }
        table
    }
}

/// Applies status transitions to people and schedules the next one.
#[derive(Clone, Debug)]
pub struct DiseaseProgression {
    config: ProgressionConfig,
    asympt_infectiousness: f64,
    sympt_infectiousness: f64,
    timesteps_per_day: f64,
    icdf: InverseCdf,
}

impl DiseaseProgression {
    pub fn new(config: &SimulationConfig) -> Self {
        DiseaseProgression {
            config: config.progression.clone(),
            asympt_infectiousness: config.infection.asympt_infectiousness,
            sympt_infectiousness: config.infection.sympt_infectiousness,
            timesteps_per_day: f64::from(config.timesteps_per_day),
            icdf: InverseCdf::exponential(),
        }
    }

    /// Moves a susceptible person to `Exposed` and schedules their next transition.
    pub fn infect(&self, context: &Context, cell: &mut Cell, person: usize, timestep: Timestep) {
        self.set_status(context, cell, person, InfectionStatus::Exposed, timestep);
    }

    /// Applies the person's scheduled transition, if they have one, and schedules the following
    /// one.
    pub fn advance(&self, context: &Context, cell: &mut Cell, person: usize, timestep: Timestep) {
        if let Some(next_status) = cell.person(person).params().next_status {
            self.set_status(context, cell, person, next_status, timestep);
        }
    }

    /// Moves a person to `status`, updates their infectiousness, and schedules their next
    /// transition.
    pub fn set_status(
        &self,
        context: &Context,
        cell: &mut Cell,
        person: usize,
        status: InfectionStatus,
        timestep: Timestep,
    ) {
        let was_infectious = cell.person(person).is_infectious();
        cell.update_person_status(person, status, timestep);

        let person = cell.person_mut(person);
        if status.is_infectious() && !was_infectious {
            self.set_infectiousness(context, person, timestep);
        } else if !status.is_infectious() {
            let params = person.params_mut();
            params.infectiousness = 0.0;
            if status.is_terminal() {
                params.infection_start_time = None;
            }
        }
        self.schedule_next(context, person, timestep);
    }

    /// Draws a starting infectiousness from Gamma(1, 1) scaled by the asymptomatic or symptomatic
    /// factor, and records the start of the infectious period.
    pub fn set_infectiousness(&self, context: &Context, person: &mut Person, timestep: Timestep) {
        let factor = if person.status() == InfectionStatus::InfectASympt {
            self.asympt_infectiousness
        } else {
            self.sympt_infectiousness
        };
        let base: f64 = context.sample_distr(ProgressionRng, Exp1);
        let params = person.params_mut();
        params.infectiousness = base * factor;
        params.infection_start_time = Some(timestep);
    }

    /// Picks the person's next status and the timestep it happens at. People in a terminal
    /// status, or in a status with no way out, have nothing scheduled.
    pub fn schedule_next(&self, context: &Context, person: &mut Person, timestep: Timestep) {
        let status = person.status();
        let next = if status.is_terminal() {
            None
        } else {
            self.next_status(context, status)
        };
        let params = person.params_mut();
        params.next_status = next;
        params.next_status_time =
            next.map(|_| timestep.saturating_add(self.transition_delay(context, status)));
        trace!(
            "person {} in {status} scheduled {:?} at {:?}",
            person.cell_pos(),
            person.params().next_status,
            person.params().next_status_time
        );
    }

    /// Draws the status that follows `status`.
    pub fn next_status(&self, context: &Context, status: InfectionStatus) -> Option<InfectionStatus> {
        let row = self.config.transition_matrix.row(status);
        if row.iter().sum::<f64>() <= 0.0 {
            return None;
        }
        let index = context.sample_weighted(ProgressionRng, &row[..]);
        InfectionStatus::iter().nth(index)
    }

    /// Draws the number of timesteps spent in `status`. Always at least one, so a transition never
    /// happens in the timestep that scheduled it.
    pub fn transition_delay(&self, context: &Context, status: InfectionStatus) -> Timestep {
        let mean = self.config.mean_duration(status);
        context
            .sample(ProgressionRng, |rng| {
                self.icdf.choose(rng, mean, self.timesteps_per_day)
            })
            .max(1)
    }
}
