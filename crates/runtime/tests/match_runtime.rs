use std::time::Duration;

use battle_content::ContentCatalog;
use battle_core::{
    AttackProfile, BattleConfig, BattleEvent, SpawnError, SpawnRequest, TeamId, UnitTypeConfig,
    Vec2, World,
};
use battle_runtime::{Event, MatchEvent, MatchRuntime, RuntimeConfig, RuntimeError, Topic};

const RED: TeamId = TeamId(1);
const BLUE: TeamId = TeamId(2);

fn catalog() -> ContentCatalog {
    ContentCatalog::new()
        .with_unit(
            UnitTypeConfig::new("fighter", 30.0, 10.0, 2.0)
                .with_attack(AttackProfile::melee(10.0, 500.0)),
        )
        .with_unit(UnitTypeConfig::new("haunted", 50.0, 0.0, 0.0).with_skill("ghost"))
}

fn world() -> World {
    let mut world = World::new(BattleConfig::default().with_seed(11)).with_match_id("duel");
    world.ledger_mut().register_team(RED, "Red");
    world.ledger_mut().register_team(BLUE, "Blue");
    world
}

async fn manual_runtime() -> MatchRuntime {
    MatchRuntime::builder()
        .world(world())
        .content(catalog())
        .build()
        .await
        .unwrap()
}

fn fighter(team: TeamId, x: f32) -> SpawnRequest {
    SpawnRequest::new("fighter", Vec2 { x, y: 400.0 }).team(team)
}

#[tokio::test]
async fn stepped_duel_reaches_game_over() {
    let runtime = manual_runtime().await;
    let handle = runtime.handle();
    let mut units = runtime.subscribe(Topic::Units);
    let mut matches = runtime.subscribe(Topic::Match);

    let red = handle.spawn(fighter(RED, 200.0)).await.unwrap();
    let blue = handle.spawn(fighter(BLUE, 400.0)).await.unwrap();
    assert_ne!(red, blue);

    let spawned = units.recv().await.unwrap();
    assert!(matches!(
        spawned,
        Event::Battle(BattleEvent::UnitSpawned { unit, .. }) if unit == red
    ));

    let mut over = false;
    for _ in 0..2_000 {
        if handle.step(16.0).await.unwrap().game_over {
            over = true;
            break;
        }
    }
    assert!(over);

    let winner = handle.wait_for_game_over().await.unwrap();
    assert!(winner == Some(RED) || winner == Some(BLUE));

    let mut saw_game_over = false;
    while let Ok(event) = matches.try_recv() {
        if matches!(event, Event::Battle(BattleEvent::GameOver { .. })) {
            saw_game_over = true;
        }
    }
    assert!(saw_game_over);

    let snapshot = runtime.shutdown().await.unwrap();
    assert!(snapshot.game_over);
    assert_eq!(snapshot.winner, winner);
    assert_eq!(snapshot.units.len(), 1);
}

#[tokio::test]
async fn speed_is_clamped_and_pause_freezes_the_clock() {
    let runtime = manual_runtime().await;
    let handle = runtime.handle();

    assert_eq!(handle.set_speed(10.0).await.unwrap(), BattleConfig::MAX_SPEED);
    let report = handle.step(10.0).await.unwrap();
    assert_eq!(report.game_delta, 30.0);

    handle.pause().await.unwrap();
    assert_eq!(handle.step(10.0).await.unwrap().game_delta, 0.0);
    assert!(handle.snapshot().await.unwrap().paused);

    handle.resume().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.paused);
    assert_eq!(snapshot.game_time, 30.0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_unit_type_fails_the_spawn() {
    let runtime = manual_runtime().await;
    let err = runtime
        .handle()
        .spawn(SpawnRequest::new("phantom", Vec2::default()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Spawn(SpawnError::UnknownUnitType(ref id)) if id == "phantom"
    ));
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn content_issues_are_forwarded_to_subscribers() {
    let runtime = manual_runtime().await;
    let mut issues = runtime.subscribe(Topic::Diagnostics);

    runtime
        .handle()
        .spawn(SpawnRequest::new("haunted", Vec2 { x: 100.0, y: 100.0 }).team(RED))
        .await
        .unwrap();

    let mut mentioned = false;
    while let Ok(event) = issues.try_recv() {
        if let Event::Issue(issue) = event
            && (issue.message.contains("ghost") || issue.source_id.contains("ghost"))
        {
            mentioned = true;
        }
    }
    assert!(mentioned);
    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn free_running_match_finishes_on_its_own() {
    let runtime = MatchRuntime::builder()
        .world(world())
        .content(catalog())
        .config(RuntimeConfig {
            free_run: true,
            ..RuntimeConfig::default()
        })
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut lifecycle = runtime.subscribe(Topic::Match);

    handle.spawn(fighter(RED, 200.0)).await.unwrap();
    handle.spawn(fighter(BLUE, 400.0)).await.unwrap();

    let winner = tokio::time::timeout(Duration::from_secs(120), handle.wait_for_game_over())
        .await
        .expect("match should end before the timeout")
        .unwrap();
    assert!(winner.is_some());

    let snapshot = runtime.shutdown().await.unwrap();
    assert!(snapshot.frame > 0);

    let mut stopped = false;
    while let Ok(event) = lifecycle.try_recv() {
        if matches!(event, Event::Match(MatchEvent::Stopped { .. })) {
            stopped = true;
        }
    }
    assert!(stopped);
}

#[tokio::test]
async fn builder_requires_content_and_a_valid_frame() {
    let missing = MatchRuntime::builder().build().await;
    assert!(matches!(missing, Err(RuntimeError::MissingContent)));

    let bad_frame = MatchRuntime::builder()
        .content(ContentCatalog::new())
        .config(RuntimeConfig {
            frame_ms: 0.0,
            ..RuntimeConfig::default()
        })
        .build()
        .await;
    assert!(matches!(bad_frame, Err(RuntimeError::InvalidFrameLength(_))));
}

#[tokio::test]
async fn handle_reports_a_stopped_worker() {
    let runtime = manual_runtime().await;
    let handle = runtime.handle();
    runtime.shutdown().await.unwrap();

    assert!(matches!(
        handle.snapshot().await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}
