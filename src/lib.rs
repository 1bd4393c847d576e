//! An agent-based simulation of proximity-driven epidemic spread
//!
//! A fixed population of agents wanders a bounded rectangle. Every tick, each pair of agents
//! close enough to touch is a contact. Infected agents count down toward recovery or death
//! once per contact, and pass the infection to susceptible agents they touch. When too many
//! agents are infected at once the health system saturates and the fatality rate rises on the
//! following tick.
//!
//! The central object is the [`Simulation`], which owns every piece of model state:
//! * the [`Population`] of agents and its status counts
//! * the saturation flag
//! * the infected-count [`History`]
//! * a [`RandomSource`] every draw goes through
//!
//! A host drives it by calling [`Simulation::step`] once per tick, or [`Simulation::run`]:
//!
//! ```rust
//! use contagion::prelude::*;
//!
//! let parameters = Parameters {
//!     population_size: 100,
//!     initial_infected_percent: 20,
//!     ..Parameters::default()
//! };
//! let mut simulation = Simulation::new(parameters, SeededRandom::new(42)).unwrap();
//! simulation.run(50, |simulation| {
//!     trace!("tick {}: {:?}", simulation.tick(), simulation.counts());
//! });
//! assert!(simulation.history().len() > 1);
//! ```
//!
//! The `contagion` binary wraps the same loop in a command line tool (see [`runner`]) that
//! reads parameters from JSON, writes CSV reports and prints execution statistics.
pub mod contact;
pub mod error;
pub mod execution_stats;
pub mod geometry;
pub mod history;
pub mod log;
pub mod movement;
pub mod parameters;
pub mod population;
pub mod prelude;
#[cfg(feature = "progress_bar")]
pub mod progress;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod status;
pub mod transition;

pub use crate::error::SimulationError;
pub use crate::geometry::{distance, Bounds, Location};
pub use crate::history::History;
pub use crate::parameters::{Parameters, Policy, PolicyFlags};
pub use crate::population::{Agent, Population, StatusCounts};
pub use crate::random::{RandomSource, ScriptedRandom, SeededRandom};
pub use crate::simulation::{RunState, Simulation};
pub use crate::status::InfectionStatus;
