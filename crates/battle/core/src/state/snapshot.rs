//! Plain-data view of the world for observers across thread boundaries.
use super::{AiId, Millis, TeamId, TeamLedger, UnitId, Vec2, World};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitView {
    pub id: UnitId,
    pub unit_type: String,
    pub team: Option<TeamId>,
    pub ai: Option<AiId>,
    pub health: f32,
    pub max_health: f32,
    pub position: Vec2,
    pub effects: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    pub game_time: Millis,
    pub real_time: Millis,
    pub frame: u64,
    pub speed: f32,
    pub paused: bool,
    pub game_over: bool,
    pub winner: Option<TeamId>,
    pub units: Vec<UnitView>,
    pub projectiles: usize,
    pub terrain_effects: usize,
    pub teams: TeamLedger,
}

impl WorldSnapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn team_units(&self, team: TeamId) -> impl Iterator<Item = &UnitView> {
        self.units.iter().filter(move |unit| unit.team == Some(team))
    }
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            game_time: self.clock.now(),
            real_time: self.clock.real_time(),
            frame: self.clock.frame(),
            speed: self.clock.speed(),
            paused: self.clock.is_paused(),
            game_over: self.game_over,
            winner: self.winner,
            units: self
                .units
                .values()
                .map(|unit| UnitView {
                    id: unit.id,
                    unit_type: unit.type_id.clone(),
                    team: unit.team,
                    ai: unit.ai,
                    health: unit.health,
                    max_health: unit.max_health,
                    position: unit.position,
                    effects: unit.effects.iter().map(|e| e.id().to_string()).collect(),
                    skills: unit.skills.iter().map(|s| s.name.clone()).collect(),
                })
                .collect(),
            projectiles: self.projectiles.len()
                + self
                    .units
                    .values()
                    .flat_map(|unit| unit.skills.iter())
                    .map(|slot| slot.in_flight())
                    .sum::<usize>(),
            terrain_effects: self.terrain.len(),
            teams: self.ledger.clone(),
        }
    }
}
