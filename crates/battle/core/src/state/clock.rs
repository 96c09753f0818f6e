//! Virtual clock shared by every timed component.
//!
//! The clock tracks two timelines. Real time is the sum of frame deltas
//! handed to [`crate::engine::BattleEngine::tick`]; game time advances by the
//! same deltas multiplied by the speed multiplier. Durations, intervals, pulse
//! spacing and deferred tasks are all compared against game time, so a speed
//! of `2.0` makes a `1000 ms` interval elapse after `500 ms` of real time.
use crate::config::BattleConfig;

/// Game time in milliseconds.
pub type Millis = f64;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameClock {
    real_ms: Millis,
    game_ms: Millis,
    speed: f32,
    paused: bool,
    frame: u64,
}

impl GameClock {
    pub fn new(speed: f32) -> Self {
        Self {
            real_ms: 0.0,
            game_ms: 0.0,
            speed: BattleConfig::clamp_speed(speed),
            paused: false,
            frame: 0,
        }
    }

    /// Current game time.
    pub fn now(&self) -> Millis {
        self.game_ms
    }

    pub fn real_time(&self) -> Millis {
        self.real_ms
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the multiplier, clamped to `[0.1, 3.0]`. Returns the applied value.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        self.speed = BattleConfig::clamp_speed(speed);
        self.speed
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Game time elapsed since `since`.
    pub fn elapsed_since(&self, since: Millis) -> Millis {
        (self.game_ms - since).max(0.0)
    }

    /// Advances both timelines by a real-time delta and returns the game-time delta.
    ///
    /// A paused clock does not move. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, real_delta_ms: Millis) -> Millis {
        if self.paused || !real_delta_ms.is_finite() || real_delta_ms <= 0.0 {
            return 0.0;
        }
        let game_delta = real_delta_ms * f64::from(self.speed);
        self.real_ms += real_delta_ms;
        self.game_ms += game_delta;
        self.frame += 1;
        game_delta
    }

    /// Number of reference frames contained in a game-time delta.
    pub fn frames_in(game_delta_ms: Millis) -> f32 {
        (game_delta_ms / BattleConfig::REFERENCE_FRAME_MS) as f32
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_time_scales_with_speed() {
        let mut clock = GameClock::new(2.0);
        assert_eq!(clock.advance(500.0), 1000.0);
        assert_eq!(clock.now(), 1000.0);
        assert_eq!(clock.real_time(), 500.0);
    }

    #[test]
    fn speed_is_clamped() {
        let mut clock = GameClock::default();
        assert_eq!(clock.set_speed(10.0), 3.0);
        assert_eq!(clock.set_speed(0.0), 0.1);
        assert_eq!(clock.set_speed(f32::NAN), 1.0);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = GameClock::default();
        clock.set_paused(true);
        assert_eq!(clock.advance(16.0), 0.0);
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.frame(), 0);
    }
}
