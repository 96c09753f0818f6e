//! Cloneable façade for interacting with the simulation worker.
//!
//! Every command carries a oneshot reply channel; the handle sends it to the
//! worker and awaits the answer, so callers see the world exactly as the
//! worker left it after their command.
use std::collections::HashMap;

use battle_core::{BattleEvent, Millis, SpawnRequest, TeamId, TickReport, UnitId, WorldSnapshot};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to a running match.
#[derive(Clone)]
pub struct MatchHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl MatchHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Spawns a unit once its content has been prefetched into the cache.
    pub async fn spawn(&self, request: SpawnRequest) -> Result<UnitId> {
        self.request(|reply| Command::Spawn { request, reply })
            .await?
    }

    /// Sets the speed multiplier, returning the clamped value in effect.
    pub async fn set_speed(&self, speed: f32) -> Result<f32> {
        self.request(|reply| Command::SetSpeed { speed, reply })
            .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::SetPaused {
            paused: true,
            reply,
        })
        .await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| Command::SetPaused {
            paused: false,
            reply,
        })
        .await
    }

    /// Advances the match by one frame of `real_delta_ms` wall time.
    pub async fn step(&self, real_delta_ms: Millis) -> Result<TickReport> {
        self.request(|reply| Command::Step {
            real_delta_ms,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stops the worker and returns the final state of the world.
    pub async fn shutdown(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Waits until the match reports a winner (or a draw).
    ///
    /// Subscribes before checking the current state so a game over that lands
    /// in between is never missed.
    pub async fn wait_for_game_over(&self) -> Result<Option<TeamId>> {
        let mut rx = self.subscribe(Topic::Match);
        let snapshot = self.snapshot().await?;
        if snapshot.game_over {
            return Ok(snapshot.winner);
        }
        loop {
            let received = tokio::select! {
                received = rx.recv() => received,
                () = self.command_tx.closed() => return Err(RuntimeError::CommandChannelClosed),
            };
            match received {
                Ok(Event::Battle(BattleEvent::GameOver { winner })) => return Ok(winner),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        target: "battle_runtime::handle",
                        skipped,
                        "match event receiver lagged"
                    );
                }
                Err(RecvError::Closed) => return Err(RuntimeError::EventStreamClosed),
            }
        }
    }

    /// Subscribe to a specific event topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
