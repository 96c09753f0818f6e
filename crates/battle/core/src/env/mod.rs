//! Collaborators the simulation consumes.
//!
//! Content, presentation, diagnostics and randomness are reached through
//! traits. [`BattleEnv`] bundles them so the engine can access everything it
//! needs without coupling to concrete implementations.
mod content;
mod diagnostics;
mod fx;
mod rng;
mod units;

pub use content::ContentOracle;
pub use diagnostics::{
    DiagnosticsSink, IssueContext, IssueSeverity, MemoryDiagnostics, TracingDiagnostics,
    ValidationIssue,
};
pub use fx::{Disposable, FxError, FxOracle, FxTarget, NullFx, SoundCue, SoundSpec, Waveform};
pub use rng::{PcgRng, RngOracle, compute_seed, roll};
pub use units::{
    Appearance, AttackProfile, AttackStyle, SpawnRequest, UnitEffectRefs, UnitSounds,
    UnitTypeConfig,
};

static DEFAULT_RNG: PcgRng = PcgRng;
static NULL_FX: NullFx = NullFx;
static TRACING_DIAGNOSTICS: TracingDiagnostics = TracingDiagnostics;

/// Collaborators borrowed by the engine for one call.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    content: &'a dyn ContentOracle,
    fx: &'a dyn FxOracle,
    diagnostics: &'a dyn DiagnosticsSink,
    rng: &'a dyn RngOracle,
}

impl<'a> BattleEnv<'a> {
    /// Content only; presentation is discarded and issues go to the log.
    pub fn new(content: &'a dyn ContentOracle) -> Self {
        Self {
            content,
            fx: &NULL_FX,
            diagnostics: &TRACING_DIAGNOSTICS,
            rng: &DEFAULT_RNG,
        }
    }

    pub fn with_all(
        content: &'a dyn ContentOracle,
        fx: &'a dyn FxOracle,
        diagnostics: &'a dyn DiagnosticsSink,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            content,
            fx,
            diagnostics,
            rng,
        }
    }

    #[must_use]
    pub fn with_fx(mut self, fx: &'a dyn FxOracle) -> Self {
        self.fx = fx;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: &'a dyn DiagnosticsSink) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = rng;
        self
    }

    pub fn content(&self) -> &'a dyn ContentOracle {
        self.content
    }

    pub fn fx(&self) -> &'a dyn FxOracle {
        self.fx
    }

    pub fn diagnostics(&self) -> &'a dyn DiagnosticsSink {
        self.diagnostics
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}
