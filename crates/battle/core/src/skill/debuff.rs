//! Debuff: applies its effect to the other side of an attack.
//!
//! Stateless per event; there is no update loop.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::{EffectDefinition, EffectSource};
use crate::engine::BattleEngine;
use crate::state::{BattleEvent, Unit, UnitId};

use super::validate::{self, SkillIssue};
use super::{Activation, SkillConfig, SkillError, SkillSlot, SkillState, schedule_suicide, slot};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    validate::require_effect(config, issues);
    let trigger = &config.trigger;
    if !(trigger.on_attack || trigger.on_attack_once || trigger.on_get_attacked) {
        issues.push(SkillIssue::warning(
            "debuff skills only fire on onAttack, onAttackOnce or onGetAttacked",
        ));
    }
}

pub(super) fn init(
    _engine: &BattleEngine<'_>,
    _owner: UnitId,
    _config: &SkillConfig,
    _effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    Ok(SkillState::Debuff { landed: 0 })
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, activation: Activation) {
    let Some(target) = activation.counterpart else {
        return;
    };
    if !engine.world.is_alive(owner) || !engine.world.is_alive(target) {
        return;
    }
    let Some((effect, config)) =
        slot(engine, owner, name).and_then(|slot| Some((slot.effect.clone()?, Arc::clone(&slot.config))))
    else {
        return;
    };

    let outcome = engine.apply_effect(target, effect, EffectSource::skill(owner, name));
    if !outcome.took_hold() {
        return;
    }
    if let Some(SkillSlot {
        state: SkillState::Debuff { landed },
        ..
    }) = super::slot_mut(engine, owner, name)
    {
        *landed += 1;
    }
    if let Some(anchor) = engine.unit_fx_target(target) {
        engine.flash_fx(config.fx.start.as_deref(), anchor);
    }
    if let Some(position) = engine.world.unit(owner).map(|u| u.position) {
        engine.play_sound(crate::env::SoundCue::SkillStart, config.sounds.start.as_ref(), position);
    }
    engine.world.outbox.push(BattleEvent::SkillActivated {
        unit: owner,
        skill: name.to_string(),
    });
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        target = %target,
        trigger = %activation.trigger,
        "debuff landed"
    );
    schedule_suicide(engine, owner, name, &config, BattleConfig::DEBUFF_SUICIDE_DELAY_MS);
}

pub(super) fn update(_engine: &mut BattleEngine<'_>, _owner: UnitId, _name: &str) {}

pub(super) fn cleanup(_engine: &mut BattleEngine<'_>, _unit: &Unit, _slot: &mut SkillSlot) {}
