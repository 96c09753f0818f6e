//! Headless match configuration read from the environment.
use std::env;
use std::path::PathBuf;

use battle_core::{BattleConfig, Millis};

/// Settings for one `arena` run.
#[derive(Clone, Debug, PartialEq)]
pub struct CliConfig {
    /// Data directory holding `config.toml`, `catalog/` and `scenarios/`.
    pub content_dir: PathBuf,
    /// Scenario name under `scenarios/`, or a path to a `.toml` file.
    pub scenario: String,
    /// Battle config file overriding `<content_dir>/config.toml`.
    pub config_path: Option<PathBuf>,
    /// Speed multiplier overriding config and scenario.
    pub speed: Option<f32>,
    /// Game time after which an undecided match is abandoned.
    pub max_seconds: f64,
    /// Wall time per simulated frame.
    pub frame_ms: Millis,
    /// Pace frames on a wall-clock timer instead of stepping as fast as possible.
    pub realtime: bool,
    pub session_id: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("data"),
            scenario: "skirmish".to_string(),
            config_path: None,
            speed: None,
            max_seconds: 300.0,
            frame_ms: BattleConfig::REFERENCE_FRAME_MS,
            realtime: false,
            session_id: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_CONTENT_DIR` - data directory (default: `data`)
    /// - `ARENA_SCENARIO` - scenario name or path (default: `skirmish`)
    /// - `ARENA_CONFIG` - battle config file
    /// - `ARENA_SPEED` - speed multiplier, clamped to the supported range
    /// - `ARENA_MAX_SECONDS` - game-time limit (default: 300)
    /// - `ARENA_FRAME_MS` - frame length in milliseconds (default: 16.67)
    /// - `ARENA_REALTIME` - `true`/`1` to pace frames in wall time
    /// - `GAME_SESSION_ID` - log session name
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = read("ARENA_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(scenario) = read("ARENA_SCENARIO") {
            config.scenario = scenario;
        }
        config.config_path = read("ARENA_CONFIG").map(PathBuf::from);
        config.speed = parse::<f32>(read("ARENA_SPEED")).map(BattleConfig::clamp_speed);
        if let Some(seconds) = parse::<f64>(read("ARENA_MAX_SECONDS")).filter(|s| *s > 0.0) {
            config.max_seconds = seconds;
        }
        if let Some(frame_ms) = parse::<f64>(read("ARENA_FRAME_MS"))
            .filter(|ms| ms.is_finite() && *ms > 0.0)
        {
            config.frame_ms = frame_ms;
        }
        config.realtime = read("ARENA_REALTIME")
            .is_some_and(|value| matches!(value.trim(), "1" | "true" | "yes"));
        config.session_id = read("GAME_SESSION_ID");

        config
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(from_pairs(&[]), CliConfig::default());
    }

    #[test]
    fn reads_and_sanitizes_values() {
        let config = from_pairs(&[
            ("ARENA_CONTENT_DIR", "/srv/arena"),
            ("ARENA_SCENARIO", "siege"),
            ("ARENA_SPEED", "9"),
            ("ARENA_MAX_SECONDS", "-5"),
            ("ARENA_FRAME_MS", "8"),
            ("ARENA_REALTIME", "true"),
            ("GAME_SESSION_ID", "run-1"),
        ]);
        assert_eq!(config.content_dir, PathBuf::from("/srv/arena"));
        assert_eq!(config.scenario, "siege");
        assert_eq!(config.speed, Some(BattleConfig::MAX_SPEED));
        assert_eq!(config.max_seconds, 300.0);
        assert_eq!(config.frame_ms, 8.0);
        assert!(config.realtime);
        assert_eq!(config.session_id.as_deref(), Some("run-1"));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = from_pairs(&[("ARENA_SPEED", "fast"), ("ARENA_FRAME_MS", "NaN")]);
        assert_eq!(config.speed, None);
        assert_eq!(config.frame_ms, BattleConfig::REFERENCE_FRAME_MS);
    }
}
