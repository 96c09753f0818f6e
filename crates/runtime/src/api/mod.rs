//! Public surface used by clients of the runtime.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::MatchHandle;
