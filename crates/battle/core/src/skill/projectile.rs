//! Projectile skill: fires a fan of projectiles at the nearest qualifying
//! unit and simulates them until they hit, leave the arena or run out of
//! range.
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::{EffectDefinition, StatKind, TargetFlags};
use crate::engine::BattleEngine;
use crate::env::IssueSeverity;
use crate::state::{Projectile, Relation, Unit, UnitId, Vec2};

use super::config::ProjectileConfig;
use super::validate::{self, SkillIssue};
use super::{
    Activation, ProjectileState, SkillConfig, SkillError, SkillSlot, SkillState, announce_start,
    poll_trigger, schedule_suicide, slot, slot_mut,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    let Some(projectile) = &config.projectile else {
        issues.push(SkillIssue::error("projectile skill requires a projectile block"));
        return;
    };
    if !(projectile.speed.is_finite() && projectile.speed > 0.0) {
        issues.push(SkillIssue::error(format!(
            "projectile.speed must be positive, got {}",
            projectile.speed
        )));
    }
    if projectile.count == 0 {
        issues.push(SkillIssue::warning("projectile.count is 0; nothing will be fired"));
    }
    if projectile.area_radius < 0.0 {
        issues.push(SkillIssue::warning("projectile.areaRadius is negative; treated as 0"));
    }
    if !projectile.affect_allies && !projectile.affect_enemies {
        issues.push(SkillIssue::warning(
            "projectile affects neither allies nor enemies; it can never hit",
        ));
    }
    validate::target_list(
        "projectile.targetType",
        projectile.target_type.as_deref(),
        issues,
    );
}

pub(super) fn init(
    engine: &BattleEngine<'_>,
    owner: UnitId,
    config: &SkillConfig,
    _effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    let projectile = config
        .projectile
        .as_ref()
        .ok_or_else(|| SkillError::MissingPayload {
            skill: config.name.clone(),
            field: "projectile",
        })?;

    let mut effects = Vec::with_capacity(projectile.effects.len());
    for id in &projectile.effects {
        match engine.env.content().effect(id) {
            Some(effect) => effects.push(effect),
            None => engine.report(
                &config.name,
                format!("projectile effect '{id}' not found; impact skips it"),
                IssueSeverity::Error,
                Some(owner),
            ),
        }
    }
    Ok(SkillState::Projectile(ProjectileState {
        effects,
        ..ProjectileState::default()
    }))
}

/// Whether the configured target list aims at allies instead of enemies.
fn aims_at_allies(projectile: &ProjectileConfig) -> bool {
    projectile
        .target_type
        .as_deref()
        .and_then(|list| TargetFlags::parse(list).ok())
        .is_some_and(|flags| {
            !flags.is_untyped()
                && !flags.contains(TargetFlags::ENEMIES)
                && flags.contains(TargetFlags::ALLIES)
        })
}

/// Launch directions spread evenly across `spread_deg` around `bearing`.
fn fan(bearing: f32, count: u32, spread_deg: f32) -> Vec<f32> {
    if count <= 1 {
        return vec![bearing; count as usize];
    }
    let spread = spread_deg.to_radians();
    let last = (count - 1) as f32;
    (0..count)
        .map(|i| bearing - spread / 2.0 + spread * i as f32 / last)
        .collect()
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, _: Activation) {
    let Some(shooter) = engine.world.unit(owner).filter(|u| u.is_alive()) else {
        return;
    };
    let Some(slot_ref) = slot(engine, owner, name) else {
        return;
    };
    let config = Arc::clone(&slot_ref.config);
    let effects = match &slot_ref.state {
        SkillState::Projectile(state) => state.effects.clone(),
        _ => return,
    };
    let Some(projectile) = config.projectile.as_ref() else {
        return;
    };

    let allies = aims_at_allies(projectile);
    let relation = if allies { Relation::Ally } else { Relation::Enemy };
    let Some(target) = engine
        .world
        .nearest(owner, relation)
        .and_then(|id| engine.world.unit(id))
    else {
        return;
    };

    let origin = shooter.position;
    let team = shooter.team;
    let damage = projectile
        .damage
        .unwrap_or_else(|| shooter.modified_stat(StatKind::Damage))
        .max(0.0);
    let bearing = origin.bearing_to(target.position);
    let max_distance = projectile
        .max_distance
        .unwrap_or(engine.world.config.projectile_max_distance);

    let mut volley = Vec::new();
    for angle in fan(bearing, projectile.count, projectile.spread_angle) {
        let id = engine.world.allocate_object_id();
        volley.push(Projectile {
            id,
            source: owner,
            source_team: team,
            position: origin,
            velocity: Vec2::from_angle(angle) * projectile.speed,
            traveled: 0.0,
            max_distance,
            damage,
            area_radius: projectile.area_radius.max(0.0),
            size: projectile.size,
            affect_allies: projectile.affect_allies || allies,
            affect_enemies: projectile.affect_enemies && !allies,
            impact_fx: projectile.impact_fx.clone(),
            sprite: projectile.sprite.clone(),
            effects: effects.clone(),
            skill: Some(name.to_string()),
        });
    }
    if volley.is_empty() {
        return;
    }

    let fired = volley.len();
    if let Some(SkillSlot {
        state: SkillState::Projectile(state),
        ..
    }) = slot_mut(engine, owner, name)
    {
        state.in_flight.extend(volley);
        state.volleys += 1;
    }
    announce_start(engine, owner, name, &config);
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        fired,
        "projectiles fired"
    );
    schedule_suicide(engine, owner, name, &config, BattleConfig::PROJECTILE_SUICIDE_DELAY_MS);
}

pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }

    let in_flight = match slot_mut(engine, owner, name).map(|slot| &mut slot.state) {
        Some(SkillState::Projectile(state)) => core::mem::take(&mut state.in_flight),
        _ => return,
    };
    let mut remaining = Vec::with_capacity(in_flight.len());
    for mut projectile in in_flight {
        if engine.advance_projectile(&mut projectile) {
            remaining.push(projectile);
        }
    }
    // The owner can die from an impact's side effects; its projectiles go with it.
    if let Some(SkillState::Projectile(state)) =
        slot_mut(engine, owner, name).map(|slot| &mut slot.state)
    {
        remaining.append(&mut state.in_flight);
        state.in_flight = remaining;
    }
}

pub(super) fn cleanup(_engine: &mut BattleEngine<'_>, unit: &Unit, slot: &mut SkillSlot) {
    if let SkillState::Projectile(state) = &mut slot.state
        && !state.in_flight.is_empty()
    {
        tracing::trace!(
            target: "battle_core::skill",
            unit = %unit.id,
            skill = %slot.name,
            dropped = state.in_flight.len(),
            "in-flight projectiles dropped"
        );
        state.in_flight.clear();
    }
}
