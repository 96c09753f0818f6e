//! Simulation worker that owns the authoritative [`battle_core::World`].
//!
//! Receives commands from [`MatchHandle`](crate::MatchHandle), advances the
//! world through [`BattleEngine`], and publishes what changed to the
//! [`EventBus`]. Frames come either from a free-running interval or from
//! explicit `Step` commands.
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    BattleEngine, BattleEnv, BattleEvent, DiagnosticsSink, FxOracle, MemoryDiagnostics, Millis,
    PcgRng, SpawnRequest, TickReport, TracingDiagnostics, UnitId, World, WorldSnapshot,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::Result;
use crate::content::CachedContentSource;
use crate::events::{Event, EventBus, FrameEvent, MatchEvent};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Prefetch content for the unit type, then place the unit.
    Spawn {
        request: SpawnRequest,
        reply: oneshot::Sender<Result<UnitId>>,
    },
    /// Change the speed multiplier; replies with the clamped value.
    SetSpeed {
        speed: f32,
        reply: oneshot::Sender<f32>,
    },
    SetPaused {
        paused: bool,
        reply: oneshot::Sender<()>,
    },
    /// Advance one frame by the given wall time.
    Step {
        real_delta_ms: Millis,
        reply: oneshot::Sender<TickReport>,
    },
    Snapshot {
        reply: oneshot::Sender<WorldSnapshot>,
    },
    /// Stop the worker; replies with the final snapshot.
    Shutdown {
        reply: oneshot::Sender<WorldSnapshot>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "Spawn",
            Self::SetSpeed { .. } => "SetSpeed",
            Self::SetPaused { .. } => "SetPaused",
            Self::Step { .. } => "Step",
            Self::Snapshot { .. } => "Snapshot",
            Self::Shutdown { .. } => "Shutdown",
        }
    }
}

/// Background task that processes match commands and frames.
pub struct SimulationWorker {
    world: World,
    content: Arc<CachedContentSource>,
    fx: Arc<dyn FxOracle>,
    diagnostics: MemoryDiagnostics,
    rng: PcgRng,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    frame_ms: Millis,
    free_run: bool,
}

impl SimulationWorker {
    pub fn new(
        world: World,
        content: Arc<CachedContentSource>,
        fx: Arc<dyn FxOracle>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        frame_ms: Millis,
        free_run: bool,
    ) -> Self {
        info!(
            target: "battle_runtime::worker",
            match_id = ?world.match_id(),
            units = world.unit_count(),
            frame_ms,
            free_run,
            "SimulationWorker initialized"
        );

        Self {
            world,
            content,
            fx,
            diagnostics: MemoryDiagnostics::new(),
            rng: PcgRng,
            command_rx,
            event_bus,
            frame_ms,
            free_run,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        self.event_bus.publish(Event::Match(MatchEvent::Started {
            match_id: self.world.match_id().map(str::to_owned),
            units: self.world.unit_count(),
        }));

        let mut frames = self.free_run.then(|| frame_interval(self.frame_ms));
        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command).await.is_break() {
                        break;
                    }
                }
                () = next_frame(&mut frames) => {
                    let report = self.advance(self.frame_ms);
                    if report.game_over {
                        frames = None;
                    }
                }
            }
        }

        self.event_bus.publish(Event::Match(MatchEvent::Stopped {
            game_time: self.world.now(),
            winner: self.world.winner(),
        }));
        debug!(target: "battle_runtime::worker", "SimulationWorker stopped");
    }

    async fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        let name = command.name();
        match command {
            Command::Spawn { request, reply } => {
                let result = self.spawn(request).await;
                send_reply(reply, result, name);
            }
            Command::SetSpeed { speed, reply } => {
                let applied = self.world.set_speed(speed);
                debug!(target: "battle_runtime::worker", requested = speed, applied, "speed changed");
                self.event_bus
                    .publish(Event::Match(MatchEvent::SpeedChanged { speed: applied }));
                send_reply(reply, applied, name);
            }
            Command::SetPaused { paused, reply } => {
                if self.world.is_paused() != paused {
                    self.world.set_paused(paused);
                    let event = if paused {
                        MatchEvent::Paused
                    } else {
                        MatchEvent::Resumed
                    };
                    self.event_bus.publish(Event::Match(event));
                }
                send_reply(reply, (), name);
            }
            Command::Step {
                real_delta_ms,
                reply,
            } => {
                let report = self.advance(real_delta_ms);
                send_reply(reply, report, name);
            }
            Command::Snapshot { reply } => {
                send_reply(reply, self.world.snapshot(), name);
            }
            Command::Shutdown { reply } => {
                send_reply(reply, self.world.snapshot(), name);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn spawn(&mut self, request: SpawnRequest) -> Result<UnitId> {
        let report = self.content.prefetch_unit(&request.unit_type).await?;
        if !report.missing.is_empty() {
            debug!(
                target: "battle_runtime::worker",
                unit_type = %request.unit_type,
                missing = ?report.missing,
                "spawning with incomplete content"
            );
        }

        let env = BattleEnv::with_all(
            self.content.as_ref(),
            self.fx.as_ref(),
            &self.diagnostics,
            &self.rng,
        );
        let result = BattleEngine::new(&mut self.world, env).spawn(request);
        self.flush();
        Ok(result?)
    }

    fn advance(&mut self, real_delta_ms: Millis) -> TickReport {
        let env = BattleEnv::with_all(
            self.content.as_ref(),
            self.fx.as_ref(),
            &self.diagnostics,
            &self.rng,
        );
        let report = BattleEngine::new(&mut self.world, env).tick(real_delta_ms);

        if report.game_delta > 0.0 {
            let clock = self.world.clock();
            self.event_bus.publish(Event::Frame(FrameEvent {
                frame: clock.frame(),
                game_time: clock.now(),
                game_delta: report.game_delta,
                units: self.world.unit_count(),
            }));
        }
        self.flush();
        report
    }

    /// Republishes the world outbox and the issues gathered since the last
    /// flush.
    fn flush(&mut self) {
        for event in self.world.drain_events() {
            if let BattleEvent::GameOver { winner } = &event {
                info!(
                    target: "battle_runtime::worker",
                    match_id = ?self.world.match_id(),
                    winner = ?winner,
                    game_time = self.world.now(),
                    "match over"
                );
            }
            self.event_bus.publish(Event::Battle(event));
        }
        for issue in self.diagnostics.drain() {
            TracingDiagnostics.report(issue.clone());
            self.event_bus.publish(Event::Issue(issue));
        }
    }
}

fn send_reply<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(
            target: "battle_runtime::worker",
            command,
            "reply channel closed (caller dropped)"
        );
    }
}

fn frame_interval(frame_ms: Millis) -> Interval {
    let mut interval = time::interval(Duration::from_secs_f64(frame_ms / 1000.0));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_frame(frames: &mut Option<Interval>) {
    match frames {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
