//! End-to-end match scenarios driven through the public engine API.
mod common;

use std::sync::Arc;

use battle_core::{
    BattleConfig, DamageSource, EffectDefinition, EffectSource, FxPhases, ProjectileConfig,
    SkillConfig, SkillKind, StatKind, SummonProperties, TriggerConfig,
};

use common::{BLUE, Harness, RED, RecordingFx, StaticContent, dummy};

#[test]
fn plain_damage_updates_unit_and_team() {
    let content = StaticContent::default().unit(dummy("grunt", 100.0));
    let mut harness = Harness::new(content);
    let attacker = harness.spawn("grunt", RED, 100.0, 100.0);
    let target = harness.spawn("grunt", BLUE, 600.0, 400.0);

    let before = harness.team_current(BLUE);
    let mut engine = harness.engine();
    let source = DamageSource::unit(engine.world(), attacker);
    let outcome = engine.apply_damage(target, 30.0, source, false);

    assert_eq!(outcome.amount(), 30.0);
    assert!(!outcome.killed());
    assert_eq!(harness.health(target), 70.0);
    assert_eq!(harness.team_current(BLUE), before - 30.0);
}

#[test]
fn shield_floors_damage_at_one() {
    let content = StaticContent::default()
        .unit(dummy("grunt", 100.0))
        .effect(EffectDefinition::shield("bulwark", 20.0).with_duration(5000.0));
    let mut harness = Harness::new(content);
    let attacker = harness.spawn("grunt", RED, 100.0, 100.0);
    let target = harness.spawn("grunt", BLUE, 600.0, 400.0);

    let mut engine = harness.engine();
    let shield = engine.env().content().effect("bulwark").unwrap();
    assert!(
        engine
            .apply_effect(target, shield, EffectSource::unit(target))
            .took_hold()
    );
    let source = DamageSource::unit(engine.world(), attacker);
    let outcome = engine.apply_damage(target, 15.0, source, false);

    assert_eq!(outcome.amount(), 1.0);
    assert_eq!(harness.health(target), 99.0);
}

#[test]
fn interval_aura_follows_game_time() {
    let aura = SkillConfig::new("war-cry", SkillKind::Aura)
        .with_trigger(TriggerConfig::every(1000.0))
        .with_effect("haste");
    let content = StaticContent::default()
        .unit(dummy("captain", 100.0).with_skill("war-cry"))
        .effect(EffectDefinition::stat("haste", StatKind::Speed, 1.0).with_duration(1500.0))
        .skill(aura);
    let mut harness = Harness::with_config(content, BattleConfig::default().with_speed(2.0));
    let captain = harness.spawn("captain", RED, 300.0, 300.0);

    let activations = |harness: &Harness| {
        harness
            .world
            .unit(captain)
            .and_then(|u| u.skill("war-cry"))
            .map_or(0, |slot| slot.activations())
    };

    harness.run(400.0, 100.0);
    assert_eq!(activations(&harness), 0);

    harness.run(100.0, 100.0);
    assert_eq!(activations(&harness), 1);

    harness.run(1000.0, 100.0);
    assert_eq!(activations(&harness), 2);
}

#[test]
fn summons_inherit_caster_health() {
    let summon = SkillConfig::new("brood", SkillKind::Summon)
        .with_trigger(TriggerConfig::on_spawn())
        .with_summon(SummonProperties {
            summon_count: 3,
            inherit_health: true,
            ..SummonProperties::default()
        });
    let content = StaticContent::default()
        .unit(dummy("matriarch", 50.0).with_skill("brood"))
        .skill(summon);
    let mut harness = Harness::new(content);
    let caster = harness.spawn("matriarch", RED, 600.0, 400.0);

    let summons: Vec<_> = harness
        .world
        .units()
        .filter(|u| u.summoned_by == Some(caster))
        .collect();
    assert_eq!(summons.len(), 3);
    for summon in summons {
        assert_eq!(summon.max_health, 50.0);
        assert_eq!(summon.health, 50.0);
        assert_eq!(summon.team, Some(RED));
    }
    assert_eq!(harness.world.ledger().team(RED).unwrap().team.units, 4);
}

#[test]
fn projectile_without_enemies_fires_nothing() {
    let volley = SkillConfig::new("volley", SkillKind::Projectile)
        .with_trigger(TriggerConfig::on_spawn())
        .with_projectile(ProjectileConfig::default());
    let content = StaticContent::default()
        .unit(dummy("archer", 100.0).with_skill("volley"))
        .skill(volley);
    let mut harness = Harness::new(content);
    let archer = harness.spawn("archer", RED, 300.0, 300.0);
    harness.run(200.0, 16.0);

    let slot = harness.world.unit(archer).unwrap().skill("volley").unwrap();
    assert_eq!(slot.in_flight(), 0);
    assert!(harness.world.projectiles().is_empty());
}

#[test]
fn failing_cleanup_does_not_block_sibling_cleanups() {
    let content = StaticContent::default()
        .unit(dummy("grunt", 100.0))
        .effect(
            EffectDefinition::stat("cursed", StatKind::Damage, -1.0)
                .with_duration(10_000.0)
                .with_target_fx(FxPhases {
                    continuous: Some("cursed-glow".into()),
                    ..FxPhases::default()
                }),
        )
        .effect(
            EffectDefinition::stat("blessed", StatKind::Damage, 1.0)
                .with_duration(10_000.0)
                .with_target_fx(FxPhases {
                    continuous: Some("blessed-glow".into()),
                    ..FxPhases::default()
                }),
        );
    let mut harness =
        Harness::new(content).with_fx(RecordingFx::failing_on(&["cursed-glow"]));
    let unit = harness.spawn("grunt", RED, 300.0, 300.0);

    let mut engine = harness.engine();
    for id in ["cursed", "blessed"] {
        let effect = engine.env().content().effect(id).unwrap();
        engine.apply_effect(unit, Arc::clone(&effect), EffectSource::unit(unit));
    }
    assert!(engine.remove_unit(unit));

    assert_eq!(harness.fx.disposed("blessed-glow"), 1);
    assert_eq!(harness.fx.disposed("cursed-glow"), 0);
    assert!(harness.diagnostics.mentions("cleanup failed"));
    assert!(!harness.world.contains(unit));
}
