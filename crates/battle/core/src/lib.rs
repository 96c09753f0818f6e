//! Deterministic real-time battle simulation.
//!
//! `battle-core` owns the rules of a 2D arena battle: units move, attack and
//! carry skills whose effects are resolved every frame. It performs no I/O;
//! content, presentation, diagnostics and randomness are reached through the
//! collaborator traits in [`env`]. All mutation flows through
//! [`engine::BattleEngine`] over an explicit [`state::World`], so a fresh
//! world is a fresh match.
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod skill;
pub mod state;

pub use config::BattleConfig;
pub use effect::{
    ActiveEffect, ApplyOutcome, DefinitionError, EffectDefinition, EffectError, EffectKind,
    EffectSource, EffectSpec, FxPhases, StatDelta, StatKind, TargetFlags,
};
pub use engine::{
    BattleEngine, DamageOutcome, DamageSource, SpawnError, TickReport, area_falloff,
};
pub use env::{
    Appearance, AttackProfile, AttackStyle, BattleEnv, ContentOracle, DiagnosticsSink,
    Disposable, FxError, FxOracle, FxTarget, IssueContext, IssueSeverity, MemoryDiagnostics,
    NullFx, PcgRng, RngOracle, SoundCue, SoundSpec, SpawnRequest, TracingDiagnostics,
    UnitEffectRefs, UnitSounds, UnitTypeConfig, ValidationIssue, Waveform,
};
pub use error::{BattleError, ErrorSeverity};
pub use event::{EventBus, EventKind, EventPayload, Listener, ListenerError, ListenerId};
pub use skill::{
    ProjectileConfig, SkillConfig, SkillError, SkillIssue, SkillKind, SkillSlot, SkillState,
    SuicideSpec, SummonProperties, TransformConfig, TriggerConfig, TriggerKind,
};
pub use state::{
    AiId, BattleEvent, Bounds, GameClock, Millis, ObjectId, TeamId, TeamLedger, Unit,
    UnitBlueprint, UnitId, Vec2, World, WorldSnapshot,
};
