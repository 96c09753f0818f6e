//! Shared fixture for battle-core integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use battle_core::{
    BattleConfig, BattleEngine, BattleEnv, ContentOracle, Disposable, EffectDefinition,
    FxError, FxOracle, FxTarget, MemoryDiagnostics, PcgRng, SkillConfig, SoundCue, SoundSpec,
    SpawnRequest, TeamId, UnitId, UnitTypeConfig, Vec2, World,
};

/// In-memory content catalog.
#[derive(Default)]
pub struct StaticContent {
    units: HashMap<String, Arc<UnitTypeConfig>>,
    skills: HashMap<String, Arc<SkillConfig>>,
    effects: HashMap<String, Arc<EffectDefinition>>,
}

impl StaticContent {
    pub fn unit(mut self, config: UnitTypeConfig) -> Self {
        self.units.insert(config.id.clone(), Arc::new(config));
        self
    }

    pub fn skill(mut self, config: SkillConfig) -> Self {
        self.skills.insert(config.name.clone(), Arc::new(config));
        self
    }

    pub fn effect(mut self, effect: EffectDefinition) -> Self {
        self.effects.insert(effect.id.clone(), Arc::new(effect));
        self
    }
}

impl ContentOracle for StaticContent {
    fn unit_type(&self, id: &str) -> Option<Arc<UnitTypeConfig>> {
        self.units.get(id).cloned()
    }

    fn skill(&self, name: &str) -> Option<Arc<SkillConfig>> {
        self.skills.get(name).cloned()
    }

    fn effect(&self, id: &str) -> Option<Arc<EffectDefinition>> {
        self.effects.get(id).cloned()
    }
}

/// Presentation sink that records every call. Cleanups of ids listed in
/// `failing` return an error instead of recording.
#[derive(Default)]
pub struct RecordingFx {
    pub applied: Mutex<Vec<String>>,
    pub disposed: Arc<Mutex<Vec<String>>>,
    pub sounds: Mutex<Vec<SoundCue>>,
    failing: HashSet<String>,
}

impl RecordingFx {
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn applied(&self, id: &str) -> usize {
        self.applied.lock().iter().filter(|a| *a == id).count()
    }

    pub fn disposed(&self, id: &str) -> usize {
        self.disposed.lock().iter().filter(|d| *d == id).count()
    }
}

impl FxOracle for RecordingFx {
    fn apply_fx(&self, id: &str, _target: FxTarget) -> Result<Disposable, FxError> {
        self.applied.lock().push(id.to_string());
        let disposed = Arc::clone(&self.disposed);
        let fails = self.failing.contains(id);
        let id = id.to_string();
        Ok(Disposable::new(move || {
            if fails {
                return Err(FxError::Cleanup {
                    id,
                    reason: "renderer lost the handle".into(),
                });
            }
            disposed.lock().push(id);
            Ok(())
        }))
    }

    fn play_sound(&self, cue: SoundCue, _spec: &SoundSpec, _at: Vec2) {
        self.sounds.lock().push(cue);
    }
}

pub const RED: TeamId = TeamId(1);
pub const BLUE: TeamId = TeamId(2);

pub struct Harness {
    pub world: World,
    pub content: StaticContent,
    pub fx: RecordingFx,
    pub diagnostics: MemoryDiagnostics,
    rng: PcgRng,
}

impl Harness {
    pub fn new(content: StaticContent) -> Self {
        Self::with_config(content, BattleConfig::default().with_seed(7))
    }

    pub fn with_config(content: StaticContent, config: BattleConfig) -> Self {
        init_tracing();
        Self {
            world: World::new(config),
            content,
            fx: RecordingFx::default(),
            diagnostics: MemoryDiagnostics::new(),
            rng: PcgRng,
        }
    }

    pub fn with_fx(mut self, fx: RecordingFx) -> Self {
        self.fx = fx;
        self
    }

    pub fn engine(&mut self) -> BattleEngine<'_> {
        let env = BattleEnv::with_all(&self.content, &self.fx, &self.diagnostics, &self.rng);
        BattleEngine::new(&mut self.world, env)
    }

    pub fn spawn(&mut self, unit_type: &str, team: TeamId, x: f32, y: f32) -> UnitId {
        self.engine()
            .spawn(SpawnRequest::new(unit_type, Vec2::new(x, y)).team(team))
            .expect("unit type is registered")
    }

    /// Advances in fixed real-time steps.
    pub fn run(&mut self, total_ms: f64, step_ms: f64) {
        let mut elapsed = 0.0;
        while elapsed + f64::EPSILON < total_ms {
            self.engine().tick(step_ms);
            elapsed += step_ms;
        }
    }

    pub fn health(&self, unit: UnitId) -> f32 {
        self.world.unit(unit).map_or(0.0, |u| u.health)
    }

    pub fn team_current(&self, team: TeamId) -> f32 {
        self.world
            .ledger()
            .team(team)
            .map_or(0.0, |entry| entry.team.current_health)
    }
}

/// Routes engine logs through the test harness; `RUST_LOG=battle_core=trace`
/// shows them for a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A plain fighter that never moves or attacks on its own.
pub fn dummy(id: &str, health: f32) -> UnitTypeConfig {
    let mut config = UnitTypeConfig::new(id, health, 0.0, 0.0);
    config.attack.range = 0.0;
    config.attack.cooldown_ms = 1.0e9;
    config
}
