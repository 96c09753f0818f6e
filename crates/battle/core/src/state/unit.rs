use crate::effect::{ActiveEffect, StatKind};
use crate::env::{Appearance, AttackProfile, Disposable, UnitEffectRefs, UnitSounds};
use crate::skill::SkillSlot;

use super::{AiId, Millis, TeamId, UnitId, Vec2};

/// Live combatant.
#[derive(Debug)]
pub struct Unit {
    pub id: UnitId,
    pub type_id: String,
    pub name: String,
    pub team: Option<TeamId>,
    pub ai: Option<AiId>,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub position: Vec2,
    pub appearance: Appearance,
    pub attack: AttackProfile,
    pub fx_refs: UnitEffectRefs,
    pub sounds: UnitSounds,
    /// Active effects in application order; ids are unique.
    pub effects: Vec<ActiveEffect>,
    /// Skills in registration order.
    pub skills: Vec<SkillSlot>,
    pub target: Option<UnitId>,
    pub last_attack_at: Option<Millis>,
    pub spawned_at: Millis,
    pub summoned_by: Option<UnitId>,
    /// Length of the summon chain that produced this unit; 0 for placed units.
    pub summon_depth: u32,
    pub continuous_fx: Disposable,
    pub(crate) dying: bool,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0 && !self.dying
    }

    pub fn radius(&self) -> f32 {
        self.appearance.radius()
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Stat before effects.
    pub fn base_stat(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Damage => self.damage,
            StatKind::Speed => self.speed,
            StatKind::AttackRange => self.attack.range,
            StatKind::AttackCooldown => self.attack.cooldown_ms as f32,
        }
    }

    /// Base stat plus the delta of every active effect, computed fresh.
    pub fn modified_stat(&self, stat: StatKind) -> f32 {
        self.base_stat(stat)
            + self
                .effects
                .iter()
                .map(|effect| effect.definition.stat_delta(stat))
                .sum::<f32>()
    }

    pub fn has_effect(&self, id: &str) -> bool {
        self.effects.iter().any(|effect| effect.id() == id)
    }

    pub fn effect(&self, id: &str) -> Option<&ActiveEffect> {
        self.effects.iter().find(|effect| effect.id() == id)
    }

    pub(crate) fn take_effect(&mut self, id: &str) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|effect| effect.id() == id)?;
        Some(self.effects.remove(index))
    }

    /// Sum of shields carried by active effects and whether any is present.
    pub fn shield(&self) -> Option<f32> {
        let shields: Vec<f32> = self
            .effects
            .iter()
            .filter(|effect| effect.definition.has_shield())
            .map(|effect| effect.definition.shield_total())
            .collect();
        (!shields.is_empty()).then(|| shields.iter().sum())
    }

    pub fn skill(&self, name: &str) -> Option<&SkillSlot> {
        self.skills.iter().find(|slot| slot.name == name)
    }

    pub(crate) fn skill_mut(&mut self, name: &str) -> Option<&mut SkillSlot> {
        self.skills.iter_mut().find(|slot| slot.name == name)
    }
}

/// Fields a unit is built from, resolved either from a unit type or from
/// summon inheritance.
#[derive(Clone, Debug)]
pub struct UnitBlueprint {
    pub type_id: String,
    pub name: String,
    pub team: Option<TeamId>,
    pub ai: Option<AiId>,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub position: Vec2,
    pub appearance: Appearance,
    pub attack: AttackProfile,
    pub fx_refs: UnitEffectRefs,
    pub sounds: UnitSounds,
    pub skills: Vec<String>,
    pub summoned_by: Option<UnitId>,
    pub summon_depth: u32,
}

impl UnitBlueprint {
    pub fn from_type(config: &crate::env::UnitTypeConfig, position: Vec2) -> Self {
        Self {
            type_id: config.id.clone(),
            name: config.name.clone(),
            team: None,
            ai: None,
            max_health: config.health,
            damage: config.damage,
            speed: config.speed,
            position,
            appearance: config.appearance.clone(),
            attack: config.attack.clone(),
            fx_refs: config.effects.clone(),
            sounds: config.sounds.clone(),
            skills: config.skills.clone(),
            summoned_by: None,
            summon_depth: 0,
        }
    }

    pub(crate) fn into_unit(self, id: UnitId, now: Millis) -> Unit {
        let max_health = if self.max_health.is_finite() {
            self.max_health.max(1.0)
        } else {
            1.0
        };
        Unit {
            id,
            type_id: self.type_id,
            name: self.name,
            team: self.team,
            ai: self.ai,
            health: max_health,
            max_health,
            damage: self.damage,
            speed: self.speed,
            position: self.position,
            appearance: self.appearance,
            attack: self.attack,
            fx_refs: self.fx_refs,
            sounds: self.sounds,
            effects: Vec::new(),
            skills: Vec::new(),
            target: None,
            last_attack_at: None,
            spawned_at: now,
            summoned_by: self.summoned_by,
            summon_depth: self.summon_depth,
            continuous_fx: Disposable::noop(),
            dying: false,
        }
    }
}
