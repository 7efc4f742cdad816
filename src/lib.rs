//! Spatial request planner: given a spatial-temporal goal formula and a
//! stream of scene observations, decides whether the goal is already
//! satisfied, a single object can be moved to advance it, or an external
//! agent must be asked for help.

pub mod automaton;
pub mod command;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod grid;
pub mod instrumentation;
pub mod planner;
pub mod request;
pub mod scene;
pub mod spatial;

pub use command::PlannerResponse;
pub use error::{PlannerError, Result};
pub use planner::{Command, Planner};
