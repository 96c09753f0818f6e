use super::{TeamId, UnitId};

/// Notable state transitions recorded for observers outside the core.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    UnitSpawned {
        unit: UnitId,
        unit_type: String,
        team: Option<TeamId>,
        summoned_by: Option<UnitId>,
    },
    UnitDied {
        unit: UnitId,
        killer: Option<UnitId>,
        team: Option<TeamId>,
    },
    UnitRemoved {
        unit: UnitId,
    },
    EffectApplied {
        unit: UnitId,
        effect: String,
    },
    EffectExpired {
        unit: UnitId,
        effect: String,
    },
    SkillActivated {
        unit: UnitId,
        skill: String,
    },
    SkillDeactivated {
        unit: UnitId,
        skill: String,
    },
    GameOver {
        winner: Option<TeamId>,
    },
}
