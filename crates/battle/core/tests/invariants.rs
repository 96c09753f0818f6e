mod common;

use battle_core::{
    ApplyOutcome, BattleEvent, DamageOutcome, DamageSource, EffectDefinition, EffectSource,
    FxPhases, StatKind, TeamId,
};

use common::{BLUE, Harness, RED, RecordingFx, StaticContent, dummy};

fn content() -> StaticContent {
    StaticContent::default()
        .unit(dummy("grunt", 100.0))
        .unit(dummy("brute", 250.0))
        .effect(EffectDefinition::stat("rage", StatKind::Damage, 5.0).with_duration(10_000.0))
        .effect(EffectDefinition::heal("mend", 40.0))
}

fn ledger_matches_units(harness: &Harness, team: TeamId) {
    let live: f32 = harness
        .world
        .units()
        .filter(|u| u.team == Some(team))
        .map(|u| u.health)
        .sum();
    assert!((harness.team_current(team) - live).abs() < 1e-3);
}

#[test]
fn health_stays_within_bounds_and_ledger_tracks_it() {
    let mut harness = Harness::new(content());
    let red = harness.spawn("grunt", RED, 100.0, 100.0);
    let blue_a = harness.spawn("grunt", BLUE, 900.0, 600.0);
    let blue_b = harness.spawn("brute", BLUE, 1000.0, 700.0);

    let mut engine = harness.engine();
    let source = DamageSource::unit(engine.world(), red);
    engine.apply_damage(blue_a, 45.0, source, false);
    engine.apply_damage(blue_b, 300.0, source, false);
    let mend = engine.env().content().effect("mend").unwrap();
    engine.apply_effect(blue_a, mend, EffectSource::unit(blue_a));
    engine.apply_heal(blue_a, 1_000.0);

    assert_eq!(harness.health(blue_a), 100.0);
    assert!(!harness.world.contains(blue_b));
    for unit in harness.world.units() {
        assert!(unit.health >= 0.0 && unit.health <= unit.max_health);
    }
    ledger_matches_units(&harness, RED);
    ledger_matches_units(&harness, BLUE);

    let blue = harness.world.ledger().team(BLUE).unwrap();
    assert_eq!(blue.team.units, 1);
    assert_eq!(blue.team.total_health, 100.0);
}

#[test]
fn reapplying_an_active_effect_is_a_no_op() {
    let mut harness = Harness::new(content());
    let unit = harness.spawn("grunt", RED, 100.0, 100.0);

    let mut engine = harness.engine();
    let rage = engine.env().content().effect("rage").unwrap();
    let first = engine.apply_effect(unit, rage.clone(), EffectSource::unit(unit));
    let second = engine.apply_effect(unit, rage, EffectSource::unit(unit));

    assert_eq!(first, ApplyOutcome::Applied);
    assert_eq!(second, ApplyOutcome::AlreadyActive);
    assert_eq!(engine.get_modified_stat(unit, StatKind::Damage), Some(5.0));
    let copies = harness
        .world
        .unit(unit)
        .unwrap()
        .effects
        .iter()
        .filter(|e| e.id() == "rage")
        .count();
    assert_eq!(copies, 1);
}

#[test]
fn removals_are_idempotent() {
    let mut harness = Harness::new(content());
    let unit = harness.spawn("grunt", RED, 100.0, 100.0);

    let mut engine = harness.engine();
    let rage = engine.env().content().effect("rage").unwrap();
    engine.apply_effect(unit, rage, EffectSource::unit(unit));
    assert!(engine.remove_effect(unit, "rage"));
    assert!(!engine.remove_effect(unit, "rage"));
    assert_eq!(engine.get_modified_stat(unit, StatKind::Damage), Some(0.0));

    assert!(engine.remove_unit(unit));
    assert!(!engine.remove_unit(unit));
    engine.kill_unit(unit, None);

    let red = harness.world.ledger().team(RED).unwrap();
    assert_eq!(red.team.units, 0);
    assert_eq!(red.team.current_health, 0.0);
}

#[test]
fn friendly_fire_is_blocked_unless_allowed() {
    let mut harness = Harness::new(content());
    let a = harness.spawn("grunt", RED, 100.0, 100.0);
    let b = harness.spawn("grunt", RED, 400.0, 100.0);

    let mut engine = harness.engine();
    let source = DamageSource::unit(engine.world(), a);
    assert_eq!(engine.apply_damage(b, 25.0, source, false), DamageOutcome::Ignored);
    assert_eq!(harness.health(b), 100.0);

    let mut engine = harness.engine();
    let dealt = engine.apply_damage(b, 25.0, source, true);
    assert_eq!(dealt.amount(), 25.0);
    assert_eq!(harness.health(b), 75.0);
}

#[test]
fn non_finite_damage_is_ignored() {
    let mut harness = Harness::new(content());
    let unit = harness.spawn("grunt", RED, 100.0, 100.0);

    let mut engine = harness.engine();
    assert_eq!(
        engine.apply_damage(unit, f32::NAN, DamageSource::NONE, true),
        DamageOutcome::Ignored
    );
    assert_eq!(engine.apply_heal(unit, f32::INFINITY), 0.0);
    assert_eq!(harness.health(unit), 100.0);
}

#[test]
fn lethal_damage_removes_the_unit_and_ends_the_match() {
    let mut harness = Harness::new(content());
    let red = harness.spawn("grunt", RED, 100.0, 100.0);
    let blue = harness.spawn("grunt", BLUE, 900.0, 600.0);

    let mut engine = harness.engine();
    let source = DamageSource::unit(engine.world(), red);
    let outcome = engine.apply_damage(blue, 500.0, source, false);
    assert!(outcome.killed());
    assert_eq!(outcome.amount(), 100.0);
    assert!(engine.refresh_game_over());

    assert!(harness.world.is_game_over());
    assert_eq!(harness.world.winner(), Some(RED));
}

#[test]
fn lethal_pulse_kills_and_keeps_the_ledger_whole() {
    let content = content().effect(EffectDefinition::damage("blight", 40.0).with_pulse(100.0));
    let mut harness = Harness::new(content);
    let victim = harness.spawn("grunt", RED, 100.0, 100.0);
    harness.spawn("brute", RED, 600.0, 400.0);

    let mut engine = harness.engine();
    let blight = engine.env().content().effect("blight").unwrap();
    assert_eq!(
        engine.apply_effect(victim, blight, EffectSource::default()),
        ApplyOutcome::Applied
    );

    harness.run(250.0, 50.0);
    assert_eq!(harness.health(victim), 20.0);
    assert_eq!(harness.team_current(RED), 270.0);

    harness.run(100.0, 50.0);
    assert!(!harness.world.contains(victim));
    assert!(
        harness
            .world
            .drain_events()
            .iter()
            .any(|event| matches!(event, BattleEvent::UnitDied { unit, .. } if *unit == victim))
    );
    ledger_matches_units(&harness, RED);
    let red = harness.world.ledger().team(RED).unwrap();
    assert_eq!(red.team.units, 1);
    assert_eq!(red.team.current_health, 250.0);
}

#[test]
fn broken_effect_is_dropped_alone() {
    let content = content()
        .effect(
            EffectDefinition::damage("rot", f32::NAN)
                .with_pulse(100.0)
                .with_target_fx(FxPhases {
                    continuous: Some("rot-glow".into()),
                    ..FxPhases::default()
                }),
        )
        .effect(EffectDefinition::heal("regrowth", 5.0).with_pulse(100.0));
    let mut harness = Harness::new(content).with_fx(RecordingFx::failing_on(&["rot-glow"]));
    let unit = harness.spawn("grunt", RED, 100.0, 100.0);

    let mut engine = harness.engine();
    engine.apply_damage(unit, 30.0, DamageSource::NONE, true);
    for id in ["rot", "regrowth"] {
        let effect = engine.env().content().effect(id).unwrap();
        engine.apply_effect(unit, effect, EffectSource::unit(unit));
    }

    harness.run(100.0, 50.0);

    let survivor = harness.world.unit(unit).unwrap();
    assert!(!survivor.has_effect("rot"));
    assert!(survivor.has_effect("regrowth"));
    assert_eq!(survivor.health, 75.0);
    assert_eq!(harness.fx.disposed("rot-glow"), 0);
    assert!(harness.diagnostics.mentions("dropped"));
    assert!(harness.diagnostics.mentions("FX_CLEANUP_FAILED"));
    ledger_matches_units(&harness, RED);
}
