//! Transform: a buff that also swaps the owner's appearance while active.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::EffectDefinition;
use crate::engine::BattleEngine;
use crate::env::Appearance;
use crate::state::{Unit, UnitId};

use super::config::TransformConfig;
use super::validate::{self, SkillIssue};
use super::{
    Activation, SkillConfig, SkillError, SkillSlot, SkillState, TransformState, buff,
    cleanup_toggle, leave_toggle, poll_trigger, slot_mut,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    validate::require_effect(config, issues);
    match &config.transform {
        None => issues.push(SkillIssue::warning(
            "transform skill has no transform block; only its effect applies",
        )),
        Some(transform) => {
            let invalid = |size: Option<f32>| size.is_some_and(|s| !(s.is_finite() && s > 0.0));
            if invalid(transform.width) || invalid(transform.height) {
                issues.push(SkillIssue::warning(
                    "transform width/height must be positive; invalid sizes are ignored",
                ));
            }
        }
    }
}

pub(super) fn init(
    _engine: &BattleEngine<'_>,
    _owner: UnitId,
    _config: &SkillConfig,
    _effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    Ok(SkillState::Transform(TransformState::default()))
}

fn transformed(original: &Appearance, transform: &TransformConfig) -> Appearance {
    let size = |value: Option<f32>, fallback: f32| {
        value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback)
    };
    Appearance {
        sprite: transform
            .sprite
            .clone()
            .unwrap_or_else(|| original.sprite.clone()),
        frames: if transform.frames.is_empty() {
            original.frames.clone()
        } else {
            transform.frames.clone()
        },
        width: size(transform.width, original.width),
        height: size(transform.height, original.height),
    }
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, _: Activation) {
    if !buff::engage(engine, owner, name, BattleConfig::TRANSFORM_SUICIDE_DELAY_MS) {
        return;
    }
    let Some(unit) = engine.world.units.get_mut(&owner) else {
        return;
    };
    let original = unit.appearance.clone();
    let Some(slot) = unit.skill_mut(name) else {
        return;
    };
    let Some(transform) = slot.config.transform.clone() else {
        return;
    };
    if let SkillState::Transform(state) = &mut slot.state {
        state.original = Some(original.clone());
    }
    unit.appearance = transformed(&original, &transform);
}

pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }
    if buff::effect_gone(engine, owner, name) && leave_toggle(engine, owner, name) {
        restore(engine, owner, name);
    }
}

/// Puts the original appearance back on a live owner.
fn restore(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    let original = match slot_mut(engine, owner, name).map(|slot| &mut slot.state) {
        Some(SkillState::Transform(state)) => state.original.take(),
        _ => None,
    };
    if let Some(original) = original
        && let Some(unit) = engine.world.units.get_mut(&owner).filter(|u| u.is_alive())
    {
        unit.appearance = original;
    }
}

pub(super) fn cleanup(engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) {
    // The owner is leaving the world; there is nothing to restore onto.
    cleanup_toggle(engine, unit, slot);
    if let SkillState::Transform(state) = &mut slot.state {
        state.original = None;
    }
}
