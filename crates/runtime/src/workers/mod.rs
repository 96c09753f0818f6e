//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the world and executes match commands; it is
//! the only task that mutates battle state.
mod simulation;

pub use simulation::{Command, SimulationWorker};
