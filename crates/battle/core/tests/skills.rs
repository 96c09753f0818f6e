//! Skill behaviour through whole ticks.
mod common;

use battle_core::{
    AttackProfile, BattleConfig, BattleEvent, DamageSource, EffectDefinition, EventKind,
    Listener, ListenerError, ProjectileConfig, SkillConfig, SkillError, SkillKind, SkillState,
    SoundCue, StatKind, SuicideSpec, SummonProperties, TargetFlags, TransformConfig,
    TriggerConfig, UnitId, UnitTypeConfig,
};

use common::{BLUE, Harness, RED, StaticContent, dummy};

fn slot_active(harness: &Harness, unit: UnitId, skill: &str) -> bool {
    harness
        .world
        .unit(unit)
        .and_then(|u| u.skill(skill))
        .is_some_and(|slot| slot.is_active())
}

#[test]
fn buff_ends_with_its_effect() {
    let buff = SkillConfig::new("frenzy", SkillKind::Buff)
        .with_trigger(TriggerConfig::on_spawn())
        .with_effect("fury");
    let content = StaticContent::default()
        .unit(dummy("berserker", 100.0).with_skill("frenzy"))
        .effect(EffectDefinition::stat("fury", StatKind::Damage, 8.0).with_duration(500.0))
        .skill(buff);
    let mut harness = Harness::new(content);
    let unit = harness.spawn("berserker", RED, 300.0, 300.0);

    assert!(slot_active(&harness, unit, "frenzy"));
    assert_eq!(harness.world.modified_stat(unit, StatKind::Damage), Some(8.0));

    harness.run(600.0, 50.0);
    assert!(!slot_active(&harness, unit, "frenzy"));
    assert_eq!(harness.world.modified_stat(unit, StatKind::Damage), Some(0.0));
    let events = harness.world.drain_events();
    assert!(events.contains(&BattleEvent::SkillDeactivated {
        unit,
        skill: "frenzy".into()
    }));
}

#[test]
fn debuff_lands_on_the_attacked_unit() {
    let venom = SkillConfig::new("venom", SkillKind::Debuff)
        .with_trigger(TriggerConfig {
            on_attack: true,
            ..TriggerConfig::default()
        })
        .with_effect("slowed");
    let stinger = UnitTypeConfig::new("stinger", 100.0, 5.0, 0.0)
        .with_attack(AttackProfile::melee(10.0, 1000.0))
        .with_skill("venom");
    let content = StaticContent::default()
        .unit(stinger)
        .unit(dummy("target", 100.0))
        .effect(EffectDefinition::stat("slowed", StatKind::Speed, -0.5).with_duration(5000.0))
        .skill(venom);
    let mut harness = Harness::new(content);
    let victim = harness.spawn("target", BLUE, 140.0, 100.0);
    let attacker = harness.spawn("stinger", RED, 100.0, 100.0);

    harness.run(50.0, 16.0);

    let victim_unit = harness.world.unit(victim).unwrap();
    assert!(victim_unit.has_effect("slowed"));
    assert_eq!(victim_unit.health, 95.0);
    let slot = harness.world.unit(attacker).unwrap().skill("venom").unwrap();
    assert!(matches!(slot.state, SkillState::Debuff { landed: 1 }));
}

#[test]
fn transform_fires_at_health_threshold() {
    let rage = SkillConfig::new("giant-form", SkillKind::Transform)
        .with_trigger(TriggerConfig {
            health_threshold: Some(0.5),
            ..TriggerConfig::default()
        })
        .with_effect("giant")
        .with_transform(TransformConfig {
            sprite: Some("giant".into()),
            width: Some(64.0),
            height: Some(64.0),
            ..TransformConfig::default()
        });
    let content = StaticContent::default()
        .unit(dummy("ogre", 100.0).with_skill("giant-form"))
        .unit(dummy("grunt", 100.0))
        .effect(EffectDefinition::stat("giant", StatKind::Damage, 10.0).with_duration(1000.0))
        .skill(rage);
    let mut harness = Harness::new(content);
    let ogre = harness.spawn("ogre", RED, 300.0, 300.0);
    let grunt = harness.spawn("grunt", BLUE, 900.0, 600.0);

    harness.run(100.0, 20.0);
    assert!(!slot_active(&harness, ogre, "giant-form"));

    let mut engine = harness.engine();
    let source = DamageSource::unit(engine.world(), grunt);
    engine.apply_damage(ogre, 60.0, source, false);
    harness.run(20.0, 20.0);

    assert!(slot_active(&harness, ogre, "giant-form"));
    let unit = harness.world.unit(ogre).unwrap();
    assert_eq!(unit.appearance.sprite, "giant");
    assert_eq!(unit.appearance.width, 64.0);

    harness.run(1100.0, 20.0);
    let unit = harness.world.unit(ogre).unwrap();
    assert!(!slot_active(&harness, ogre, "giant-form"));
    assert_eq!(unit.appearance.sprite, "unit");
    assert!(unit.skill("giant-form").unwrap().gate().threshold_fired());
}

#[test]
fn teleport_jumps_inside_the_arena() {
    let blink = SkillConfig::new("blink", SkillKind::Teleport)
        .with_trigger(TriggerConfig::every(500.0));
    let content = StaticContent::default()
        .unit(dummy("mage", 100.0).with_skill("blink"))
        .skill(blink);
    let mut harness = Harness::new(content);
    let mage = harness.spawn("mage", RED, 300.0, 300.0);

    harness.run(550.0, 50.0);

    let unit = harness.world.unit(mage).unwrap();
    let jumps = match &unit.skill("blink").unwrap().state {
        SkillState::Teleport(state) => state.jumps,
        other => panic!("unexpected state {other:?}"),
    };
    assert_eq!(jumps, 1);
    assert!(harness.world.is_in_bounds(unit.position));
}

#[test]
fn projectile_hit_leaves_terrain_behind() {
    let fireball = SkillConfig::new("fireball", SkillKind::Projectile)
        .with_trigger(TriggerConfig::on_spawn())
        .with_projectile(ProjectileConfig {
            damage: Some(20.0),
            effects: vec!["scorch".into()],
            ..ProjectileConfig::default()
        });
    let content = StaticContent::default()
        .unit(dummy("wizard", 100.0).with_skill("fireball"))
        .unit(dummy("grunt", 100.0))
        .effect(
            EffectDefinition::damage("scorch", 5.0)
                .with_pulse(500.0)
                .with_duration(2000.0)
                .anchored_to_ground(),
        )
        .skill(fireball);
    let mut harness = Harness::new(content);
    let grunt = harness.spawn("grunt", BLUE, 500.0, 300.0);
    let wizard = harness.spawn("wizard", RED, 300.0, 300.0);

    let in_flight = harness
        .world
        .unit(wizard)
        .and_then(|u| u.skill("fireball"))
        .map_or(0, |slot| slot.in_flight());
    assert_eq!(in_flight, 1);

    harness.run(1000.0, 16.0);

    assert_eq!(harness.world.terrain_effects().len(), 1);
    let health = harness.health(grunt);
    assert!(health <= 75.0, "health {health}");
    assert!(health >= 65.0, "health {health}");
    assert_eq!(harness.health(wizard), 100.0);
}

#[test]
fn death_summon_rings_the_fallen_unit() {
    let brood = SkillConfig::new("last-breath", SkillKind::Summon)
        .with_trigger(TriggerConfig {
            on_death: true,
            ..TriggerConfig::default()
        })
        .with_summon(SummonProperties {
            summon_count: 2,
            health: Some(20.0),
            ..SummonProperties::default()
        });
    let content = StaticContent::default()
        .unit(dummy("hive", 100.0).with_skill("last-breath"))
        .skill(brood);
    let mut harness = Harness::new(content);
    let hive = harness.spawn("hive", RED, 600.0, 400.0);

    harness.engine().kill_unit(hive, None);

    assert!(!harness.world.contains(hive));
    let spawn: Vec<_> = harness
        .world
        .units()
        .filter(|u| u.summoned_by == Some(hive))
        .collect();
    assert_eq!(spawn.len(), 2);
    assert!(spawn.iter().all(|u| u.max_health == 20.0));
}

#[test]
fn suicide_kills_the_owner_after_the_delay() {
    let sacrifice = SkillConfig::new("sacrifice", SkillKind::Buff)
        .with_trigger(TriggerConfig::on_spawn())
        .with_effect("zeal")
        .with_suicide(SuicideSpec::Flag(true));
    let content = StaticContent::default()
        .unit(dummy("zealot", 100.0).with_skill("sacrifice"))
        .effect(EffectDefinition::stat("zeal", StatKind::Damage, 3.0).with_duration(5000.0))
        .skill(sacrifice);
    let mut harness = Harness::new(content);
    let zealot = harness.spawn("zealot", RED, 300.0, 300.0);

    harness.run(250.0, 50.0);
    assert!(harness.world.contains(zealot));

    harness.run(100.0, 50.0);
    assert!(!harness.world.contains(zealot));
    let died = harness
        .world
        .drain_events()
        .into_iter()
        .any(|event| matches!(event, BattleEvent::UnitDied { unit, .. } if unit == zealot));
    assert!(died);
}

#[test]
fn failing_listener_does_not_stop_the_next_one() {
    let content = StaticContent::default().unit(dummy("grunt", 100.0));
    let mut harness = Harness::new(content);
    let unit = harness.spawn("grunt", RED, 300.0, 300.0);

    let bus = harness.world.events_mut();
    bus.on(
        unit,
        EventKind::DamageReceived,
        Listener::hook(|_| Err(ListenerError("boom".into()))),
    );
    bus.on(
        unit,
        EventKind::DamageReceived,
        Listener::hook(|payload| {
            payload.damage *= 2.0;
            Ok(())
        }),
    );

    harness.engine().apply_damage(unit, 10.0, battle_core::DamageSource::NONE, true);

    assert_eq!(harness.health(unit), 80.0);
    assert!(harness.diagnostics.mentions("boom"));
}

#[test]
fn missing_effect_id_is_reported_and_skipped() {
    let broken = SkillConfig::new("hollow", SkillKind::Buff).with_trigger(TriggerConfig::on_spawn());
    let content = StaticContent::default()
        .unit(dummy("grunt", 100.0))
        .skill(broken);
    let mut harness = Harness::new(content);
    let unit = harness.spawn("grunt", RED, 300.0, 300.0);

    let result = harness.engine().apply_skill(unit, "hollow");
    assert!(matches!(result, Err(SkillError::MissingEffectId { .. })));
    assert!(!harness.diagnostics.errors().is_empty());
    assert!(harness.world.unit(unit).unwrap().skill("hollow").is_none());
    assert!(harness.world.is_alive(unit));
}

#[test]
fn unknown_skill_is_reported() {
    let content = StaticContent::default().unit(dummy("grunt", 100.0).with_skill("ghost"));
    let mut harness = Harness::new(content);
    let unit = harness.spawn("grunt", RED, 300.0, 300.0);

    assert!(harness.world.unit(unit).unwrap().skills.is_empty());
    assert!(harness.diagnostics.mentions("ghost"));
}

#[test]
fn melee_duel_ends_the_match() {
    let fighter = UnitTypeConfig::new("fighter", 30.0, 10.0, 2.0)
        .with_attack(AttackProfile::melee(10.0, 500.0));
    let content = StaticContent::default().unit(fighter);
    let mut harness = Harness::new(content);
    let red = harness.spawn("fighter", RED, 200.0, 400.0);
    let blue = harness.spawn("fighter", BLUE, 400.0, 400.0);

    let mut over = false;
    for _ in 0..2_000 {
        if harness.engine().tick(16.0).game_over {
            over = true;
            break;
        }
    }

    assert!(over);
    let winner = harness.world.winner().expect("one side is left standing");
    let (survivor, fallen) = if winner == RED { (red, blue) } else { (blue, red) };
    assert!(harness.world.contains(survivor));
    assert!(!harness.world.contains(fallen));
    assert!(
        harness
            .world
            .drain_events()
            .contains(&BattleEvent::GameOver {
                winner: Some(winner)
            })
    );
}

#[test]
fn aura_pulses_each_target_on_its_own_cadence() {
    let thorns = SkillConfig::new("thorn-field", SkillKind::Aura)
        .with_trigger(TriggerConfig::on_spawn())
        .with_effect("thorns");
    let mending = SkillConfig::new("mending-ring", SkillKind::Aura)
        .with_trigger(TriggerConfig::on_spawn())
        .with_effect("mend");
    let content = StaticContent::default()
        .unit(
            dummy("warden", 100.0)
                .with_skill("thorn-field")
                .with_skill("mending-ring"),
        )
        .unit(dummy("grunt", 100.0))
        .effect(
            EffectDefinition::damage("thorns", 10.0)
                .with_pulse(1000.0)
                .with_aura_radius(200.0)
                .with_targets(TargetFlags::ENEMIES),
        )
        .effect(
            EffectDefinition::heal("mend", 5.0)
                .with_pulse(1000.0)
                .with_aura_radius(200.0)
                .with_targets(TargetFlags::ALLIES | TargetFlags::SELF),
        )
        .skill(thorns)
        .skill(mending);
    let mut harness = Harness::new(content);
    let warden = harness.spawn("warden", RED, 300.0, 300.0);
    let squire = harness.spawn("grunt", RED, 300.0, 400.0);
    let near = harness.spawn("grunt", BLUE, 400.0, 300.0);
    let far = harness.spawn("grunt", BLUE, 1000.0, 700.0);
    {
        let mut engine = harness.engine();
        engine.apply_damage(warden, 30.0, DamageSource::NONE, true);
        engine.apply_damage(squire, 30.0, DamageSource::NONE, true);
    }

    harness.run(500.0, 50.0);
    assert_eq!(harness.health(near), 90.0);

    let late = harness.spawn("grunt", BLUE, 300.0, 200.0);
    harness.run(100.0, 50.0);
    assert_eq!(harness.health(late), 90.0);
    assert_eq!(harness.health(near), 90.0);

    harness.run(800.0, 50.0);
    assert_eq!(harness.health(near), 80.0);
    assert_eq!(harness.health(late), 90.0);
    assert_eq!(harness.health(far), 100.0);
    assert_eq!(harness.health(warden), 80.0);
    assert_eq!(harness.health(squire), 80.0);
}

#[test]
fn area_burst_spares_allies_and_fades_with_distance() {
    let bomb = SkillConfig::new("bomb", SkillKind::Projectile)
        .with_trigger(TriggerConfig::on_spawn())
        .with_projectile(ProjectileConfig {
            damage: Some(50.0),
            area_radius: 100.0,
            ..ProjectileConfig::default()
        });
    let content = StaticContent::default()
        .unit(dummy("bombard", 100.0).with_skill("bomb"))
        .unit(dummy("grunt", 100.0))
        .skill(bomb);
    let mut harness = Harness::new(content);
    let struck = harness.spawn("grunt", BLUE, 500.0, 300.0);
    let beside = harness.spawn("grunt", BLUE, 500.0, 340.0);
    let outside = harness.spawn("grunt", BLUE, 700.0, 500.0);
    let squire = harness.spawn("grunt", RED, 500.0, 250.0);
    let bombard = harness.spawn("bombard", RED, 300.0, 300.0);

    harness.run(1000.0, 16.0);

    assert_eq!(harness.health(struck), 50.0);
    let splash = 100.0 - harness.health(beside);
    assert!((15.0..=19.0).contains(&splash), "splash {splash}");
    assert_eq!(harness.health(outside), 100.0);
    assert_eq!(harness.health(squire), 100.0);
    assert_eq!(harness.health(bombard), 100.0);
}

#[test]
fn expired_summons_leave_without_dying() {
    let imps = SkillConfig::new("imps", SkillKind::Summon)
        .with_trigger(TriggerConfig::on_spawn())
        .with_summon(SummonProperties {
            health: Some(20.0),
            summon_duration: 500.0,
            ..SummonProperties::default()
        });
    let content = StaticContent::default()
        .unit(dummy("warlock", 100.0).with_skill("imps"))
        .skill(imps);
    let mut harness = Harness::new(content);
    let warlock = harness.spawn("warlock", RED, 600.0, 400.0);
    let imp = harness
        .world
        .units()
        .find(|u| u.summoned_by == Some(warlock))
        .map(|u| u.id)
        .expect("one imp summoned");
    harness.world.drain_events();

    harness.run(400.0, 50.0);
    assert!(harness.world.contains(imp));

    harness.run(200.0, 50.0);
    assert!(!harness.world.contains(imp));
    let events = harness.world.drain_events();
    assert!(events.contains(&BattleEvent::UnitRemoved { unit: imp }));
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, BattleEvent::UnitDied { .. }))
    );
    assert_eq!(harness.fx.applied("death"), 0);
    assert!(!harness.fx.sounds.lock().contains(&SoundCue::Death));
    let red = harness.world.ledger().team(RED).unwrap();
    assert_eq!(red.team.units, 1);
    assert_eq!(red.team.current_health, 100.0);
}

#[test]
fn self_summoning_type_stops_at_the_depth_limit() {
    let brood = SkillConfig::new("brood", SkillKind::Summon)
        .with_trigger(TriggerConfig::on_spawn())
        .with_summon(SummonProperties {
            unit_type: Some("spawner".into()),
            ..SummonProperties::default()
        });
    let content = StaticContent::default()
        .unit(dummy("spawner", 10.0).with_skill("brood"))
        .skill(brood);
    let mut harness = Harness::new(content);
    harness.spawn("spawner", RED, 600.0, 400.0);

    let depth = BattleConfig::MAX_SUMMON_DEPTH;
    assert_eq!(harness.world.unit_count(), depth as usize + 1);
    let deepest = harness.world.units().map(|u| u.summon_depth).max();
    assert_eq!(deepest, Some(depth));
    assert!(harness.diagnostics.mentions("depth limit"));
}
