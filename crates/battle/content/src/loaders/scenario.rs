//! Scenario loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::scenario::Scenario;

/// Loader for match scenarios from TOML files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load scenario {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_teams_and_spawns() {
        let scenario = ScenarioLoader::parse(
            r#"
            matchId = "ridge"
            seed = 11

            [[teams]]
            id = 1
            name = "Red"
            ais = [{ id = 3, name = "red-bot" }]

            [[teams]]
            id = 2
            name = "Blue"

            [[spawns]]
            unitType = "knight"
            team = 1
            ai = 3
            x = 120.0
            y = 200.0
            count = 2
            "#,
        )
        .unwrap();

        assert_eq!(scenario.match_id.as_deref(), Some("ridge"));
        assert_eq!(scenario.seed, Some(11));
        assert_eq!(scenario.teams.len(), 2);
        assert_eq!(scenario.teams[0].ais[0].name, "red-bot");
        assert_eq!(scenario.spawns[0].count, 2);
        assert_eq!(scenario.spawns[0].spacing, 40.0);
    }
}
