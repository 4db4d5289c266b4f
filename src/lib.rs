//! An agent-based epidemic simulation engine.
//!
//! A [`Population`](population::Population) of people, grouped into cells and microcells, is
//! advanced through discrete timesteps. Infection spreads within households and between cells,
//! and infected people progress through a sequence of disease statuses until they recover or die.
//!
//! The pieces fit together as follows:
//! * [`population`] holds the agent data model and the incremental per-microcell compartment
//!   counts, plus helpers that assemble a population and link households and places.
//! * [`sweep`] defines the per-timestep update operators: household, place and spatial
//!   transmission, host progression and random seeding.
//! * [`progression`] holds the state transition matrix and the scheduling of transitions, drawn
//!   with the [`inverse_cdf`] sampler.
//! * [`simulation`] runs sweeps group by group each timestep and hands the population to
//!   [`report`]ers.
//! * [`context`] and [`random`] carry the per-run services, most importantly independent seeded
//!   random number streams, so every run is reproducible from its seed.
pub mod config;
pub mod context;
pub mod error;
pub mod hashing;
pub mod inverse_cdf;
pub mod log;
pub mod population;
pub mod prelude;
pub mod progression;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod sweep;

pub use config::{InfectionConfig, ProgressionConfig, SimulationConfig};
pub use context::Context;
pub use error::EpiabmError;
pub use hashing::{HashMap, HashSet};
pub use inverse_cdf::InverseCdf;
pub use population::{
    Cell, CompartmentCounter, Household, InfectionStatus, Microcell, Person, PersonAddress, Place,
    Population, Timestep,
};
pub use random::ContextRandomExt;
pub use runner::{run_with_args, run_with_base_args, BaseArgs};
pub use simulation::{Simulation, SimulationState};

// Re-exported for use in `define_rng!`.
pub use rand;
