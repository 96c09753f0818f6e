//! One headless match: load content, run it to the end, summarize.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, ContentFactory, Scenario};
use battle_core::{Millis, TeamId, ValidationIssue, World, WorldSnapshot};
use battle_runtime::{MatchHandle, MatchRuntime, RuntimeConfig, RuntimeError, Topic};
use tokio::sync::broadcast::error::TryRecvError;

use crate::config::CliConfig;

/// Outcome of a finished (or abandoned) match.
#[derive(Clone, Debug)]
pub struct MatchReport {
    pub match_id: Option<String>,
    pub decided: bool,
    pub winner: Option<TeamId>,
    pub teams: Vec<TeamSummary>,
    pub game_time: Millis,
    pub frames: u64,
    pub issues: usize,
}

#[derive(Clone, Debug)]
pub struct TeamSummary {
    pub id: TeamId,
    pub name: String,
    pub survivors: usize,
    pub health: f32,
}

impl MatchReport {
    fn new(scenario: &Scenario, snapshot: &WorldSnapshot, issues: usize) -> Self {
        let teams = scenario
            .teams
            .iter()
            .map(|team| {
                let id = TeamId(team.id);
                let survivors: Vec<_> = snapshot.team_units(id).collect();
                TeamSummary {
                    id,
                    name: snapshot
                        .teams
                        .team_name(id)
                        .map_or_else(|| format!("team {}", team.id), str::to_owned),
                    survivors: survivors.len(),
                    health: survivors.iter().map(|unit| unit.health).sum(),
                }
            })
            .collect();

        Self {
            match_id: scenario.match_id.clone(),
            decided: snapshot.game_over,
            winner: snapshot.winner,
            teams,
            game_time: snapshot.game_time,
            frames: snapshot.frame,
            issues,
        }
    }

    pub fn print(&self, log_file: &Path) {
        println!(
            "match {}: {:.1}s of game time over {} frames",
            self.match_id.as_deref().unwrap_or("<unnamed>"),
            self.game_time / 1000.0,
            self.frames
        );
        let verdict = match (self.decided, self.winner) {
            (false, _) => "undecided (time limit reached)".to_string(),
            (true, None) => "draw".to_string(),
            (true, Some(winner)) => {
                let name = self
                    .teams
                    .iter()
                    .find(|team| team.id == winner)
                    .map_or_else(|| winner.to_string(), |team| team.name.clone());
                format!("{name} wins")
            }
        };
        println!("result: {verdict}");
        for team in &self.teams {
            println!(
                "  {:<12} {:>3} standing, {:>7.1} health",
                team.name, team.survivors, team.health
            );
        }
        if self.issues > 0 {
            println!("{} content issue(s) reported, see {}", self.issues, log_file.display());
        }
    }
}

/// Runs the configured scenario to completion.
pub async fn run_match(config: &CliConfig) -> Result<MatchReport> {
    let factory = ContentFactory::new(&config.content_dir);

    let battle = match &config.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let loaded = factory.load_catalog()?;
    log_issues("catalog", &loaded.issues);

    let scenario = factory.load_scenario(&config.scenario)?;
    let scenario_issues = scenario.validate();
    log_issues("scenario", &scenario_issues);
    if scenario_issues.iter().any(ValidationIssue::is_error) {
        anyhow::bail!("scenario '{}' is invalid", config.scenario);
    }

    let mut battle = scenario.configure(battle);
    if let Some(speed) = config.speed {
        battle.initial_speed = speed;
    }
    let mut world = World::new(battle.clone());
    if let Some(match_id) = &scenario.match_id {
        world = world.with_match_id(match_id.clone());
    }
    scenario.register(world.ledger_mut());

    let runtime = MatchRuntime::builder()
        .world(world)
        .content(loaded.catalog)
        .config(RuntimeConfig {
            battle: battle.clone(),
            frame_ms: config.frame_ms,
            free_run: config.realtime,
            ..RuntimeConfig::default()
        })
        .build()
        .await
        .context("Failed to start the match runtime")?;
    let handle = runtime.handle();
    let mut issues = handle.subscribe(Topic::Diagnostics);

    tracing::info!(
        match_id = ?scenario.match_id,
        scenario = %config.scenario,
        teams = scenario.teams.len(),
        speed = battle.initial_speed,
        "match starting"
    );

    for request in scenario.spawn_requests() {
        let unit_type = request.unit_type.clone();
        match handle.spawn(request).await {
            Ok(unit) => tracing::debug!(unit = %unit, unit_type = %unit_type, "unit placed"),
            Err(RuntimeError::Spawn(err)) => {
                tracing::error!(unit_type = %unit_type, "spawn failed: {}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let limit_ms = config.max_seconds * 1000.0;
    if config.realtime {
        run_realtime(&handle, limit_ms, battle.initial_speed).await?;
    } else {
        run_stepped(&handle, limit_ms, config.frame_ms).await?;
    }

    let mut issue_count = 0;
    loop {
        match issues.try_recv() {
            Ok(_) => issue_count += 1,
            Err(TryRecvError::Lagged(skipped)) => issue_count += skipped as usize,
            Err(_) => break,
        }
    }

    let snapshot = runtime.shutdown().await?;
    let report = MatchReport::new(&scenario, &snapshot, issue_count);
    tracing::info!(
        decided = report.decided,
        winner = ?report.winner,
        game_time = report.game_time,
        "match finished"
    );
    Ok(report)
}

/// Steps frames back to back until the match ends or the limit is hit.
async fn run_stepped(handle: &MatchHandle, limit_ms: Millis, frame_ms: Millis) -> Result<()> {
    let mut elapsed = 0.0;
    while elapsed < limit_ms {
        let report = handle.step(frame_ms).await?;
        if report.game_over {
            return Ok(());
        }
        if report.game_delta <= 0.0 {
            anyhow::bail!("the match clock is not advancing");
        }
        elapsed += report.game_delta;
    }
    tracing::warn!(limit_ms, "game-time limit reached without a winner");
    Ok(())
}

/// Lets the worker free-run and waits for the end in wall time.
async fn run_realtime(handle: &MatchHandle, limit_ms: Millis, speed: f32) -> Result<()> {
    let wall_limit = Duration::from_secs_f64(limit_ms / 1000.0 / f64::from(speed.max(0.1)));
    match tokio::time::timeout(wall_limit, handle.wait_for_game_over()).await {
        Ok(winner) => {
            winner?;
        }
        Err(_) => tracing::warn!(limit_ms, "game-time limit reached without a winner"),
    }
    Ok(())
}

fn log_issues(origin: &str, issues: &[ValidationIssue]) {
    for issue in issues {
        if issue.is_error() {
            tracing::error!(origin, source = %issue.source_id, "{}", issue.message);
        } else {
            tracing::warn!(origin, source = %issue.source_id, "{}", issue.message);
        }
    }
}
