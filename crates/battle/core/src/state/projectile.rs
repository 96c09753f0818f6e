use std::sync::Arc;

use crate::effect::EffectDefinition;

use super::{Millis, ObjectId, TeamId, UnitId, Vec2};

/// Projectile in flight, fired by a base ranged attack or a projectile skill.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: ObjectId,
    pub source: UnitId,
    pub source_team: Option<TeamId>,
    pub position: Vec2,
    /// Displacement per reference frame.
    pub velocity: Vec2,
    pub traveled: f32,
    pub max_distance: f32,
    pub damage: f32,
    /// Zero for single-target projectiles.
    pub area_radius: f32,
    pub size: f32,
    pub affect_allies: bool,
    pub affect_enemies: bool,
    pub impact_fx: Option<String>,
    pub sprite: Option<String>,
    /// Secondary effects applied on impact.
    pub effects: Vec<Arc<EffectDefinition>>,
    pub skill: Option<String>,
}

impl Projectile {
    pub fn remaining_range(&self) -> f32 {
        (self.max_distance - self.traveled).max(0.0)
    }
}

/// Short-lived melee swing visual.
#[derive(Clone, Debug, PartialEq)]
pub struct MeleeStrike {
    pub attacker: UnitId,
    pub target: UnitId,
    pub from: Vec2,
    pub to: Vec2,
    pub expires_at: Millis,
}
