//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Every key is optional; missing keys keep their [`BattleConfig`]
    /// defaults. The speed multiplier is clamped into the supported range.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let mut config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config.initial_speed = BattleConfig::clamp_speed(config.initial_speed);
        if !(config.arena_width > 0.0 && config.arena_height > 0.0) {
            anyhow::bail!(
                "arena must have a positive size, got {}x{}",
                config.arena_width,
                config.arena_height
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = ConfigLoader::parse("arenaWidth = 900.0\nseed = 42\n").unwrap();
        assert_eq!(config.arena_width, 900.0);
        assert_eq!(config.arena_height, BattleConfig::DEFAULT_ARENA_HEIGHT);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn speed_is_clamped() {
        let config = ConfigLoader::parse("initialSpeed = 10.0").unwrap();
        assert_eq!(config.initial_speed, BattleConfig::MAX_SPEED);
    }

    #[test]
    fn empty_arena_is_rejected() {
        assert!(ConfigLoader::parse("arenaWidth = 0.0").is_err());
    }
}
