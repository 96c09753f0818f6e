//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive a match.
use std::sync::Arc;

use battle_core::{BattleConfig, FxOracle, Millis, World, WorldSnapshot};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::api::{MatchHandle, Result, RuntimeError};
use crate::content::{CachedContentSource, ContentSource};
use crate::events::{Event, EventBus, Topic};
use crate::fx::TracingFx;
use crate::workers::SimulationWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Wall time covered by one free-running frame.
    pub frame_ms: Millis,
    /// Advance on a timer instead of waiting for `step` commands.
    pub free_run: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            frame_ms: BattleConfig::REFERENCE_FRAME_MS,
            free_run: false,
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates one match.
///
/// [`MatchHandle`] provides a cloneable façade for clients.
pub struct MatchRuntime {
    handle: MatchHandle,
    worker: JoinHandle<()>,
}

impl MatchRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> MatchHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Stops the worker, waits for it to finish and returns the final world.
    pub async fn shutdown(self) -> Result<WorldSnapshot> {
        let snapshot = self.handle.shutdown().await?;
        self.worker.await.map_err(RuntimeError::WorkerJoin)?;
        Ok(snapshot)
    }
}

/// Builder for [`MatchRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    content: Option<Arc<dyn ContentSource>>,
    fx: Option<Arc<dyn FxOracle>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            content: None,
            fx: None,
        }
    }

    /// Override runtime configuration
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a pre-built world, e.g. with teams already registered.
    ///
    /// When omitted, a fresh world is created from the battle config.
    #[must_use]
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Set the required content source
    #[must_use]
    pub fn content(mut self, source: impl ContentSource + 'static) -> Self {
        self.content = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn shared_content(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content = Some(source);
        self
    }

    /// Set the presentation sink. Defaults to [`TracingFx`].
    #[must_use]
    pub fn fx(mut self, fx: impl FxOracle + 'static) -> Self {
        self.fx = Some(Arc::new(fx));
        self
    }

    #[must_use]
    pub fn free_run(mut self, enable: bool) -> Self {
        self.config.free_run = enable;
        self
    }

    /// Build the runtime and spawn its worker on the current tokio runtime.
    pub async fn build(self) -> Result<MatchRuntime> {
        let content = self.content.ok_or(RuntimeError::MissingContent)?;
        let frame_ms = self.config.frame_ms;
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return Err(RuntimeError::InvalidFrameLength(frame_ms));
        }

        let world = self
            .world
            .unwrap_or_else(|| World::new(self.config.battle.clone()));
        let fx = self
            .fx
            .unwrap_or_else(|| Arc::new(TracingFx) as Arc<dyn FxOracle>);

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = MatchHandle::new(command_tx, event_bus.clone());

        let worker = SimulationWorker::new(
            world,
            Arc::new(CachedContentSource::from_shared(content)),
            fx,
            command_rx,
            event_bus,
            frame_ms,
            self.config.free_run,
        );
        let worker = tokio::spawn(worker.run());

        Ok(MatchRuntime { handle, worker })
    }
}
