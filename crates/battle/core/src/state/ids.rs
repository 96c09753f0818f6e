use core::fmt;

/// Stable identifier of a live unit. Also the event-bus key for that unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl UnitId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Team a unit fights for. Units without a team treat everyone as hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team#{}", self.0)
    }
}

/// Controlling AI (content author) within a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiId(pub u32);

impl fmt::Display for AiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai#{}", self.0)
    }
}

/// Identifier of a projectile or terrain effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub u32);

/// Team relationship used by every targeting and friendly-fire check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Same,
    Ally,
    Enemy,
}

impl Relation {
    /// Two units are allies only when both carry the same team id.
    pub fn between(a: (UnitId, Option<TeamId>), b: (UnitId, Option<TeamId>)) -> Self {
        if a.0 == b.0 {
            return Self::Same;
        }
        match (a.1, b.1) {
            (Some(lhs), Some(rhs)) if lhs == rhs => Self::Ally,
            _ => Self::Enemy,
        }
    }
}

/// True when both teams are known and equal.
pub fn same_team(a: Option<TeamId>, b: Option<TeamId>) -> bool {
    matches!((a, b), (Some(lhs), Some(rhs)) if lhs == rhs)
}
