//! Buff: applies its effect to the owner and stays active while that effect
//! is present.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::{ApplyOutcome, EffectSource};
use crate::engine::BattleEngine;
use crate::state::{Millis, Unit, UnitId};

use super::validate::{self, SkillIssue};
use super::{
    Activation, SkillConfig, SkillError, SkillSlot, SkillState, ToggleState, announce_start,
    cleanup_toggle, enter_toggle, leave_toggle, poll_trigger, schedule_suicide, slot,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    validate::require_effect(config, issues);
}

pub(super) fn init(
    _engine: &BattleEngine<'_>,
    _owner: UnitId,
    _config: &SkillConfig,
    _effect: Option<&Arc<crate::effect::EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    Ok(SkillState::Buff(ToggleState::default()))
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, _: Activation) {
    engage(engine, owner, name, BattleConfig::BUFF_SUICIDE_DELAY_MS);
}

/// Applies the slot's effect to its owner and enters the toggle when the
/// effect is stored. Shared with transform. Returns whether the toggle was
/// entered.
pub(super) fn engage(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    suicide_default: Millis,
) -> bool {
    let Some(slot) = slot(engine, owner, name) else {
        return false;
    };
    if slot.is_active() {
        return false;
    }
    let Some(effect) = slot.effect.clone() else {
        return false;
    };
    let config = Arc::clone(&slot.config);

    let entered = match engine.apply_effect(owner, effect, EffectSource::skill(owner, name)) {
        ApplyOutcome::Applied => enter_toggle(engine, owner, name),
        // Instant effects land without leaving anything to stay active for.
        ApplyOutcome::Landed => {
            announce_start(engine, owner, name, &config);
            false
        }
        ApplyOutcome::AlreadyActive | ApplyOutcome::TargetMissing | ApplyOutcome::Unresolved => {
            return false;
        }
    };
    schedule_suicide(engine, owner, name, &config, suicide_default);
    entered
}

pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }
    if effect_gone(engine, owner, name) {
        leave_toggle(engine, owner, name);
    }
}

/// Active, but the effect instance it applied is no longer on the owner.
pub(super) fn effect_gone(engine: &BattleEngine<'_>, owner: UnitId, name: &str) -> bool {
    let Some(unit) = engine.world.unit(owner) else {
        return false;
    };
    let Some(slot) = unit.skill(name).filter(|slot| slot.is_active()) else {
        return false;
    };
    slot.effect
        .as_ref()
        .is_some_and(|effect| !unit.has_effect(&effect.id))
}

pub(super) fn cleanup(engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) {
    cleanup_toggle(engine, unit, slot);
}
