//! Summon: spawns allied units around the caster.
//!
//! Each stat of a summon resolves independently: an explicit value wins,
//! then the inherit flag (caster's maximum), then the named unit type, then
//! half of the caster's value.
use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use crate::config::BattleConfig;
use crate::effect::EffectDefinition;
use crate::engine::BattleEngine;
use crate::env::{AttackStyle, UnitTypeConfig};
use crate::state::{DeferredTask, Unit, UnitBlueprint, UnitId, Vec2};

use super::config::SummonProperties;
use super::validate::SkillIssue;
use super::{
    Activation, SkillConfig, SkillError, SkillSlot, SkillState, SummonState, TriggerKind,
    announce_start, poll_trigger, schedule_suicide, slot, slot_mut,
};

pub(super) fn validate(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    let Some(props) = &config.summon_properties else {
        issues.push(SkillIssue::error("summon skill requires summonProperties"));
        return;
    };
    if props.summon_count == 0 {
        issues.push(SkillIssue::warning("summonCount is 0; nothing will be summoned"));
    }
    if props.summon_duration.is_nan() || (props.summon_duration < 0.0 && props.summon_duration != -1.0) {
        issues.push(SkillIssue::warning(format!(
            "summonDuration {} is neither -1 nor a positive duration; summons are permanent",
            props.summon_duration
        )));
    }
    let explicit_and_inherit = [
        ("health", props.health.is_some() && props.inherit_health),
        ("damage", props.damage.is_some() && props.inherit_damage),
        ("speed", props.speed.is_some() && props.inherit_speed),
        ("graphics", props.graphics.is_some() && props.inherit_graphics),
        ("attackType", props.attack_type.is_some() && props.inherit_attack_type),
        ("attackRange", props.attack_range.is_some() && props.inherit_attack_range),
    ];
    for (field, both) in explicit_and_inherit {
        if both {
            issues.push(SkillIssue::warning(format!(
                "{field} is set explicitly and inherited; the explicit value wins"
            )));
        }
    }
}

pub(super) fn init(
    _engine: &BattleEngine<'_>,
    _owner: UnitId,
    config: &SkillConfig,
    _effect: Option<&Arc<EffectDefinition>>,
) -> Result<SkillState, SkillError> {
    if config.summon_properties.is_none() {
        return Err(SkillError::MissingPayload {
            skill: config.name.clone(),
            field: "summonProperties",
        });
    }
    Ok(SkillState::Summon(SummonState::default()))
}

/// Resolves one stat: explicit, inherited, unit type, then half the caster's.
fn resolve(explicit: Option<f32>, inherit: bool, caster: f32, template: Option<f32>) -> f32 {
    explicit
        .filter(|value| value.is_finite())
        .or(inherit.then_some(caster))
        .or(template)
        .unwrap_or(caster / 2.0)
}

/// Builds the blueprint every summon of one firing shares.
pub(crate) fn summon_blueprint(
    caster: &Unit,
    props: &SummonProperties,
    template: Option<&UnitTypeConfig>,
) -> UnitBlueprint {
    let mut attack = template
        .map(|t| t.attack.clone())
        .unwrap_or_else(|| caster.attack.clone());
    attack.style = props
        .attack_type
        .or(props.inherit_attack_type.then_some(caster.attack.style))
        .or(template.map(|t| t.attack.style))
        .unwrap_or(AttackStyle::Melee);
    attack.range = resolve(
        props.attack_range,
        props.inherit_attack_range,
        caster.attack.range,
        template.map(|t| t.attack.range),
    );

    let appearance = props
        .graphics
        .clone()
        .or_else(|| props.inherit_graphics.then(|| caster.appearance.clone()))
        .or_else(|| template.map(|t| t.appearance.clone()))
        .unwrap_or_else(|| caster.appearance.scaled(0.5));

    UnitBlueprint {
        type_id: template.map_or_else(|| format!("{}-summon", caster.type_id), |t| t.id.clone()),
        name: template.map_or_else(|| format!("{} summon", caster.name), |t| t.name.clone()),
        team: caster.team,
        ai: caster.ai,
        max_health: resolve(
            props.health,
            props.inherit_health,
            caster.max_health,
            template.map(|t| t.health),
        ),
        damage: resolve(
            props.damage,
            props.inherit_damage,
            caster.damage,
            template.map(|t| t.damage),
        ),
        speed: resolve(
            props.speed,
            props.inherit_speed,
            caster.speed,
            template.map(|t| t.speed),
        ),
        position: caster.position,
        appearance,
        attack,
        fx_refs: template.map(|t| t.effects.clone()).unwrap_or_default(),
        sounds: template.map(|t| t.sounds.clone()).unwrap_or_default(),
        skills: template.map(|t| t.skills.clone()).unwrap_or_default(),
        summoned_by: Some(caster.id),
        summon_depth: caster.summon_depth + 1,
    }
}

/// Placement angles. On death the summons ring the corpse; otherwise they
/// fan over the half circle facing `bearing`.
fn placement_angles(count: u32, on_death: bool, bearing: f32) -> Vec<f32> {
    let n = count as f32;
    (0..count)
        .map(|i| {
            let i = i as f32;
            if on_death {
                TAU * i / n
            } else {
                bearing - PI / 2.0 + PI * (i + 0.5) / n
            }
        })
        .collect()
}

pub(super) fn fire(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str, activation: Activation) {
    if engine.world.is_game_over() {
        return;
    }
    let on_death = activation.trigger == TriggerKind::Death;
    let Some(caster) = engine
        .world
        .unit(owner)
        .filter(|caster| on_death || caster.is_alive())
    else {
        return;
    };
    let Some(config) = slot(engine, owner, name).map(|slot| Arc::clone(&slot.config)) else {
        return;
    };
    let Some(props) = config.summon_properties.as_ref() else {
        return;
    };
    if props.summon_count == 0 {
        return;
    }
    if caster.summon_depth >= BattleConfig::MAX_SUMMON_DEPTH {
        engine.report(
            name,
            format!(
                "summon chain of {} reached the depth limit of {}; firing skipped",
                caster.type_id,
                BattleConfig::MAX_SUMMON_DEPTH
            ),
            crate::env::IssueSeverity::Error,
            Some(owner),
        );
        return;
    }

    let template = match props.unit_type.as_deref() {
        Some(type_id) => match engine.env.content().unit_type(type_id) {
            Some(template) => Some(template),
            None => {
                engine.report(
                    name,
                    format!("summon unit type '{type_id}' not found"),
                    crate::env::IssueSeverity::Error,
                    Some(owner),
                );
                return;
            }
        },
        None => None,
    };

    let blueprint = summon_blueprint(caster, props, template.as_deref());
    let facing = activation
        .counterpart
        .or(caster.target)
        .and_then(|target| engine.world.unit(target))
        .map_or(0.0, |target| caster.position.bearing_to(target.position));
    let radius = engine.world.config.summon_radius + caster.radius();
    let center = caster.position;
    let angles = placement_angles(props.summon_count, on_death, facing);
    let lifetime = (props.summon_duration > 0.0).then_some(props.summon_duration);

    if !on_death {
        announce_start(engine, owner, name, &config);
    }
    let mut spawned = Vec::with_capacity(angles.len());
    for angle in angles {
        let mut summon = blueprint.clone();
        summon.position = center + Vec2::from_angle(angle) * radius;
        let id = engine.spawn_blueprint(summon);
        if let Some(lifetime) = lifetime {
            let due_at = engine.world.now() + lifetime;
            engine
                .world
                .scheduler
                .schedule(due_at, DeferredTask::ExpireSummon { unit: id });
        }
        spawned.push(id);
    }
    tracing::debug!(
        target: "battle_core::skill",
        unit = %owner,
        skill = %name,
        trigger = %activation.trigger,
        count = spawned.len(),
        "summoned"
    );
    if let Some(SkillSlot {
        state: SkillState::Summon(state),
        ..
    }) = slot_mut(engine, owner, name)
    {
        state.spawned.extend(spawned);
    }
    if !on_death {
        schedule_suicide(engine, owner, name, &config, BattleConfig::SUMMON_SUICIDE_DELAY_MS);
    }
}

/// Event-driven summons never poll; only threshold and pure interval
/// configurations run from the tick loop.
pub(super) fn update(engine: &mut BattleEngine<'_>, owner: UnitId, name: &str) {
    let event_driven = super::slot(engine, owner, name)
        .is_some_and(|slot| slot.config.trigger.is_event_driven());
    if event_driven {
        return;
    }
    if let Some(trigger) = poll_trigger(engine, owner, name) {
        fire(engine, owner, name, Activation::tick(trigger));
    }
}

pub(super) fn cleanup(_engine: &mut BattleEngine<'_>, _unit: &Unit, _slot: &mut SkillSlot) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Appearance, AttackProfile};

    fn caster() -> Unit {
        let config = UnitTypeConfig::new("necromancer", 80.0, 12.0, 2.0)
            .with_attack(AttackProfile::ranged(120.0, 900.0, 6.0))
            .with_appearance(Appearance::new("necro", 40.0, 40.0));
        UnitBlueprint::from_type(&config, Vec2::new(100.0, 100.0)).into_unit(UnitId(1), 0.0)
    }

    #[test]
    fn explicit_beats_inherit_beats_default() {
        let props = SummonProperties {
            health: Some(30.0),
            inherit_health: true,
            inherit_damage: true,
            ..SummonProperties::default()
        };
        let bp = summon_blueprint(&caster(), &props, None);
        assert_eq!(bp.max_health, 30.0);
        assert_eq!(bp.damage, 12.0);
        assert_eq!(bp.speed, 1.0);
        assert_eq!(bp.attack.range, 60.0);
        assert_eq!(bp.appearance.width, 20.0);
        assert_eq!(bp.attack.style, AttackStyle::Melee);
        assert!(bp.skills.is_empty());
    }

    #[test]
    fn template_values_replace_the_half_default() {
        let template = UnitTypeConfig::new("skeleton", 25.0, 4.0, 3.0).with_skill("rattle");
        let props = SummonProperties {
            unit_type: Some("skeleton".into()),
            inherit_speed: true,
            ..SummonProperties::default()
        };
        let bp = summon_blueprint(&caster(), &props, Some(&template));
        assert_eq!(bp.type_id, "skeleton");
        assert_eq!(bp.max_health, 25.0);
        assert_eq!(bp.speed, 2.0);
        assert_eq!(bp.skills, vec!["rattle".to_string()]);
        assert_eq!(bp.summoned_by, Some(UnitId(1)));
        assert_eq!(bp.summon_depth, 1);
    }

    #[test]
    fn death_ring_spreads_over_full_circle() {
        let angles = placement_angles(4, true, 1.0);
        assert_eq!(angles.len(), 4);
        assert!((angles[2] - PI).abs() < 1e-5);

        let fan = placement_angles(2, false, 0.0);
        assert!(fan.iter().all(|a| a.abs() <= PI / 2.0));
    }
}
