//! Aura: while active, applies its effect to every qualifying unit around
//! the owner each frame.
//!
//! The authored effect decides what a pass does. A forwarding effect hands
//! its target to each unit in range, a direct effect pulses heal/damage per
//! target on its own cadence, and anything else is applied as-is. The aura
//! goes inactive when the authored effect's own duration runs out.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::{EffectDefinition, EffectSource};
use crate::engine::BattleEngine;
use crate::state::{Unit, UnitId};

use super::validate::{self, SkillIssue};
use super::{
    Activation, AuraState, SkillConfig, SkillError, SkillSlot, SkillState, enter_toggle,
    leave_toggle, poll_trigger, schedule_suicide, slot, slot_mut,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    validate::require_effect(config, issues);
}

pub(super) fn init(
    engine: &BattleEngine<'_>,
    _owner: UnitId,
    _config: &SkillConfig,
    effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    let forward = match effect {
        Some(effect) if effect.forwards_to().is_some() => {
            Some(engine.resolve_forwarding(Arc::clone(effect))?)
        }
        _ => None,
    };
    Ok(SkillState::Aura(AuraState {
        forward,
        ..AuraState::default()
    }))
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, _: Activation) {
    if !enter_toggle(engine, owner, name) {
        return;
    }
    if let Some(config) = slot(engine, owner, name).map(|slot| Arc::clone(&slot.config)) {
        schedule_suicide(engine, owner, name, &config, BattleConfig::AURA_SUICIDE_DELAY_MS);
    }
}

pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }

    let now = engine.world.now();
    let Some(slot) = slot(engine, owner, name) else {
        return;
    };
    let SkillState::Aura(state) = &slot.state else {
        return;
    };
    if !state.toggle.active {
        return;
    }
    let Some(effect) = slot.effect.clone() else {
        return;
    };
    let started = state.toggle.activated_at.unwrap_or(now);
    if let Some(duration) = effect.duration_ms
        && now - started >= duration
    {
        deactivate(engine, owner, name);
        return;
    }
    pass(engine, owner, name);
}

/// One target-selection and application sweep.
fn pass(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    let Some(unit) = engine.world.unit(owner).filter(|u| u.is_alive()) else {
        return;
    };
    let Some(slot) = unit.skill(name) else {
        return;
    };
    let SkillState::Aura(state) = &slot.state else {
        return;
    };
    let Some(effect) = slot.effect.clone() else {
        return;
    };
    let forward = state.forward.clone();
    let radius = effect
        .aura_radius
        .unwrap_or(engine.world.config.default_aura_radius);
    let targets = engine.world.filtered_in_range(
        unit.position,
        radius,
        Some(owner),
        unit.team,
        effect.targets,
    );

    match (forward, effect.direct_amounts()) {
        (Some(forward), _) => spread(engine, owner, name, &forward, &targets),
        (None, Some((heal, damage))) => {
            let interval = effect
                .pulse_interval_ms
                .filter(|interval| *interval > 0.0)
                .unwrap_or(engine.world.config.default_pulse_interval_ms);
            pulse(engine, owner, name, &targets, interval, heal, damage);
        }
        (None, None) => spread(engine, owner, name, &effect, &targets),
    }
}

/// Applies `effect` to every target. Permanent copies on units that left the
/// radius are taken back.
fn spread(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    effect: &Arc<EffectDefinition>,
    targets: &[UnitId],
) {
    for &target in targets {
        engine.apply_effect(target, Arc::clone(effect), EffectSource::skill(owner, name));
    }
    release(engine, owner, name, effect, targets);
}

fn pulse(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    targets: &[UnitId],
    interval: f64,
    heal: f32,
    damage: f32,
) {
    let now = engine.world.now();
    let live: Vec<UnitId> = engine.world.unit_ids();
    let Some(SkillSlot {
        state: SkillState::Aura(state),
        ..
    }) = slot_mut(engine, owner, name)
    else {
        return;
    };
    state.pulses.retain(|unit, _| live.binary_search(unit).is_ok());

    let mut due = Vec::new();
    for &target in targets {
        match state.pulses.get(&target).copied() {
            // First sight pulses immediately.
            None => {
                state.pulses.insert(target, now);
                due.push(target);
            }
            Some(last) if now - last >= interval => {
                state.pulses.insert(target, now - (now - last) % interval);
                due.push(target);
            }
            Some(_) => {}
        }
    }

    for target in due {
        tracing::trace!(
            target: "battle_core::skill",
            unit = %owner,
            skill = %name,
            target = %target,
            heal,
            damage,
            "aura pulse"
        );
        engine.apply_heal(target, heal);
        engine.apply_direct_damage(target, damage, Some(owner));
    }
}

/// Removes permanent copies of `effect` this aura placed on units outside `keep`.
fn release(
    engine: &mut BattleEngine<'_>,
    owner: UnitId,
    name: &str,
    effect: &EffectDefinition,
    keep: &[UnitId],
) {
    if effect.duration_ms.is_some() {
        return;
    }
    let stale: Vec<UnitId> = engine
        .world
        .units()
        .filter(|unit| !keep.contains(&unit.id))
        .filter(|unit| {
            unit.effect(&effect.id).is_some_and(|active| {
                active.source.unit == Some(owner) && active.source.skill.as_deref() == Some(name)
            })
        })
        .map(|unit| unit.id)
        .collect();
    for unit in stale {
        engine.remove_effect(unit, &effect.id);
    }
}

fn applied_effect(slot: &SkillSlot) -> Option<Arc<EffectDefinition>> {
    match &slot.state {
        SkillState::Aura(AuraState {
            forward: Some(forward),
            ..
        }) => Some(Arc::clone(forward)),
        _ => slot.effect.clone(),
    }
}

fn deactivate(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    let Some(slot) = slot_mut(engine, owner, name) else {
        return;
    };
    if let SkillState::Aura(state) = &mut slot.state {
        state.pulses.clear();
    }
    let applied = applied_effect(slot);
    if leave_toggle(engine, owner, name)
        && let Some(applied) = applied
    {
        release(engine, owner, name, &applied, &[]);
    }
}

pub(super) fn cleanup(engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) {
    let applied = applied_effect(slot);
    if super::cleanup_toggle(engine, unit, slot)
        && let Some(applied) = applied
    {
        release(engine, unit.id, &slot.name, &applied, &[]);
    }
}
