//! Everything a host program usually needs, in one import.
pub use crate::error::SimulationError;
pub use crate::geometry::{Bounds, Location};
pub use crate::history::History;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::{Parameters, Policy, PolicyFlags};
pub use crate::population::{Agent, Population, StatusCounts};
pub use crate::random::{RandomSource, ScriptedRandom, SeededRandom};
pub use crate::report::{Report, ReportOptions, ReportWriter};
pub use crate::simulation::{RunState, Simulation};
pub use crate::status::InfectionStatus;
