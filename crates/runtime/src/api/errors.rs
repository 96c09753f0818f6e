//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, content sources and the
//! simulation so clients can bubble them up with consistent context.
use battle_core::{Millis, SpawnError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::content::SourceError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime event stream closed")]
    EventStreamClosed,

    #[error("runtime requires a content source before building")]
    MissingContent,

    #[error("frame length must be a positive number of milliseconds, got {0}")]
    InvalidFrameLength(Millis),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Content(#[from] SourceError),
}
