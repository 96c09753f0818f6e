//! Match setup: teams, their AIs and the units they field.
use battle_core::{AiId, BattleConfig, SpawnRequest, TeamId, TeamLedger, ValidationIssue, Vec2};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AiSpec {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TeamSpec {
    pub id: u32,
    pub name: String,
    pub ais: Vec<AiSpec>,
}

/// A group of identical units placed in a column.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SpawnSpec {
    pub unit_type: String,
    pub team: u32,
    pub ai: Option<u32>,
    pub x: f32,
    pub y: f32,
    pub count: u32,
    /// Vertical distance between copies.
    pub spacing: f32,
}

impl Default for SpawnSpec {
    fn default() -> Self {
        Self {
            unit_type: String::new(),
            team: 0,
            ai: None,
            x: 0.0,
            y: 0.0,
            count: 1,
            spacing: 40.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Scenario {
    pub match_id: Option<String>,
    /// Overrides the configured seed.
    pub seed: Option<u64>,
    /// Overrides the configured speed multiplier.
    pub speed: Option<f32>,
    pub teams: Vec<TeamSpec>,
    pub spawns: Vec<SpawnSpec>,
}

impl Scenario {
    /// Applies the scenario's overrides on top of `config`.
    pub fn configure(&self, mut config: BattleConfig) -> BattleConfig {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(speed) = self.speed {
            config.initial_speed = BattleConfig::clamp_speed(speed);
        }
        config
    }

    /// Names every team and AI in the ledger so diagnostics can use them.
    pub fn register(&self, ledger: &mut TeamLedger) {
        for team in &self.teams {
            ledger.register_team(TeamId(team.id), team.name.clone());
            for ai in &team.ais {
                ledger.register_ai(TeamId(team.id), AiId(ai.id), ai.name.clone());
            }
        }
    }

    /// Expands every spawn entry into individual requests, in file order.
    pub fn spawn_requests(&self) -> Vec<SpawnRequest> {
        self.spawns
            .iter()
            .flat_map(|spawn| {
                (0..spawn.count).map(move |i| {
                    let position = Vec2::new(spawn.x, spawn.y + spawn.spacing * i as f32);
                    let request =
                        SpawnRequest::new(spawn.unit_type.clone(), position).team(TeamId(spawn.team));
                    match spawn.ai {
                        Some(ai) => request.ai(AiId(ai)),
                        None => request,
                    }
                })
            })
            .collect()
    }

    /// Structural problems: undeclared teams or AIs, empty entries.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let source = self.match_id.as_deref().unwrap_or("scenario");
        if self.teams.len() < 2 {
            issues.push(ValidationIssue::warning(
                source,
                "fewer than two teams: the match cannot end in a victory",
            ));
        }
        for (index, spawn) in self.spawns.iter().enumerate() {
            if spawn.unit_type.trim().is_empty() {
                issues.push(ValidationIssue::error(
                    source,
                    format!("spawn #{index} has no unit type"),
                ));
            }
            if spawn.count == 0 {
                issues.push(ValidationIssue::warning(
                    source,
                    format!("spawn #{index} ({}) has count 0", spawn.unit_type),
                ));
            }
            let Some(team) = self.teams.iter().find(|team| team.id == spawn.team) else {
                issues.push(ValidationIssue::error(
                    source,
                    format!("spawn #{index} uses undeclared team {}", spawn.team),
                ));
                continue;
            };
            if let Some(ai) = spawn.ai
                && !team.ais.iter().any(|declared| declared.id == ai)
            {
                issues.push(ValidationIssue::error(
                    source,
                    format!("spawn #{index} uses AI {ai} not declared by team {}", team.id),
                ));
            }
        }
        issues
    }
}
