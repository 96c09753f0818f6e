use battle_core::{Millis, TeamId};
use serde::{Deserialize, Serialize};

/// Match-level transitions driven by commands rather than by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    Started { match_id: Option<String>, units: usize },
    SpeedChanged { speed: f32 },
    Paused,
    Resumed,
    Stopped {
        game_time: Millis,
        winner: Option<TeamId>,
    },
}

/// Summary of one simulated frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameEvent {
    pub frame: u64,
    pub game_time: Millis,
    pub game_delta: Millis,
    pub units: usize,
}
