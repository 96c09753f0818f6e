use std::sync::Arc;

use crate::effect::{EffectDefinition, TargetFlags};
use crate::env::Disposable;

use super::{Millis, ObjectId, TeamId, UnitId, Vec2};

/// What a terrain effect does to units standing in it.
#[derive(Clone, Debug)]
pub enum TerrainPayload {
    /// Applies the effect to each qualifying unit (uniqueness still holds).
    Apply(Arc<EffectDefinition>),
    /// Heals and/or damages each qualifying unit on every pulse.
    Direct { heal: f32, damage: f32 },
}

/// Area-anchored effect not bound to a unit.
#[derive(Debug)]
pub struct TerrainEffect {
    pub id: ObjectId,
    pub effect_id: String,
    pub position: Vec2,
    pub radius: f32,
    pub targets: TargetFlags,
    pub team: Option<TeamId>,
    pub source: Option<UnitId>,
    pub duration_ms: Millis,
    pub pulse_interval_ms: Millis,
    pub payload: TerrainPayload,
    pub created_at: Millis,
    pub last_pulse: Millis,
    pub visual: Disposable,
}
