//! Async orchestration for arena battles.
//!
//! The runtime owns a background simulation worker and exposes a cloneable
//! [`MatchHandle`] that clients use to spawn units, steer the clock and read
//! snapshots. Modules are organized by responsibility:
//!
//! - [`api`]: public handle and error types
//! - [`content`]: async content sources and the prefetching cache
//! - [`events`]: topic-based broadcast bus for battle, match and diagnostic events
//! - [`fx`]: presentation sink that mirrors effects into the log
//! - [`workers`]: the simulation worker that owns the [`battle_core::World`]
//! - [`runtime`]: builder and orchestrator tying the pieces together
pub mod api;
pub mod content;
pub mod events;
pub mod fx;
pub mod runtime;
pub mod workers;

pub use api::{MatchHandle, Result, RuntimeError};
pub use content::{CachedContentSource, ContentRef, ContentSource, PrefetchReport, SourceError};
pub use events::{Event, EventBus, FrameEvent, MatchEvent, Topic};
pub use fx::TracingFx;
pub use runtime::{MatchRuntime, RuntimeBuilder, RuntimeConfig};
pub use workers::{Command, SimulationWorker};
