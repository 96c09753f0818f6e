//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, LoadedCatalog, ScenarioLoader};
use crate::scenario::Scenario;

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml          (optional)
/// ├── catalog/
/// │   ├── units.json
/// │   ├── skills.json
/// │   └── effects.json
/// └── scenarios/
///     └── skirmish.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`, or defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(
                target: "battle_content::loaders",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load and merge every catalog file under `catalog/`.
    pub fn load_catalog(&self) -> LoadResult<LoadedCatalog> {
        CatalogLoader::load_dir(&self.data_dir.join("catalog"))
    }

    /// Load a scenario from `scenarios/{name}.toml`. A name ending in
    /// `.toml` is taken as a path instead.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = if name.ends_with(".toml") {
            PathBuf::from(name)
        } else {
            self.data_dir.join("scenarios").join(format!("{name}.toml"))
        };
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let factory = ContentFactory::new("/nonexistent/battle-data");
        assert_eq!(factory.load_config().unwrap(), BattleConfig::default());
    }
}
