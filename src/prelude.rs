pub use crate::config::SimulationConfig;
pub use crate::context::Context;
pub use crate::error::EpiabmError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::population::{
    HouseholdLinker, InfectionStatus, PersonAddress, PlaceLinker, Population, PopulationFactory,
    Timestep,
};
pub use crate::random::ContextRandomExt;
pub use crate::report::{CellCompartmentReporter, PopulationCompartmentReporter, TimestepReporter};
pub use crate::simulation::Simulation;
pub use crate::sweep::{
    HostProgressionSweep, HouseholdSweep, PlaceSweep, RandomSeedSweep, SpatialSweep, Sweep,
};
pub use crate::{define_data_plugin, define_rng};
