//! Teleport: jumps the owner to a uniformly random point in the arena.
//!
//! `targetSelection` is validated but every mode places uniformly at random.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::EffectDefinition;
use crate::engine::BattleEngine;
use crate::env::{FxTarget, SoundCue, roll};
use crate::state::{BattleEvent, Unit, UnitId, Vec2};

use super::config::TARGET_SELECTIONS;
use super::validate::SkillIssue;
use super::{
    Activation, SkillConfig, SkillError, SkillSlot, SkillState, TeleportState, poll_trigger,
    schedule_suicide, slot, slot_mut,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    if let Some(selection) = config.target_selection.as_deref()
        && !TARGET_SELECTIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(selection))
    {
        issues.push(SkillIssue::warning(format!(
            "unknown targetSelection '{selection}'; expected one of {}",
            TARGET_SELECTIONS.join(", ")
        )));
    }
}

pub(super) fn init(
    _engine: &BattleEngine<'_>,
    _owner: UnitId,
    _config: &SkillConfig,
    _effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    Ok(SkillState::Teleport(TeleportState::default()))
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, activation: Activation) {
    let Some(unit) = engine.world.unit(owner).filter(|u| u.is_alive()) else {
        return;
    };
    let Some(config) = slot(engine, owner, name).map(|slot| Arc::clone(&slot.config)) else {
        return;
    };
    let from = unit.position;
    let margin = unit.radius();
    let bounds = engine.world.bounds();

    let seed_x = engine.roll_seed(owner, roll::TELEPORT_X);
    let seed_y = engine.roll_seed(owner, roll::TELEPORT_Y);
    let rng = engine.env.rng();
    let to = Vec2::new(
        rng.range_f32(seed_x, margin, bounds.width - margin),
        rng.range_f32(seed_y, margin, bounds.height - margin),
    );
    let to = bounds.clamp(to, margin);

    engine.flash_fx(config.fx.start.as_deref(), FxTarget::Point(from));
    engine.play_sound(SoundCue::SkillStart, config.sounds.start.as_ref(), from);
    if let Some(unit) = engine.world.units.get_mut(&owner) {
        unit.position = to;
    }
    if let Some(SkillSlot {
        state: SkillState::Teleport(state),
        ..
    }) = slot_mut(engine, owner, name)
    {
        state.jumps += 1;
    }
    engine.flash_fx(
        config.fx.end.as_deref(),
        FxTarget::Unit {
            id: owner,
            position: to,
        },
    );
    engine.play_sound(SoundCue::SkillEnd, config.sounds.end.as_ref(), to);
    engine.world.outbox.push(BattleEvent::SkillActivated {
        unit: owner,
        skill: name.to_string(),
    });
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        trigger = %activation.trigger,
        x = to.x,
        y = to.y,
        "teleported"
    );
    schedule_suicide(engine, owner, name, &config, BattleConfig::TELEPORT_SUICIDE_DELAY_MS);
}

pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }
}

pub(super) fn cleanup(_engine: &mut BattleEngine<'_>, _unit: &Unit, _slot: &mut SkillSlot) {}
