//! Rule engine over a [`World`].
//!
//! [`BattleEngine`] borrows the world mutably together with the collaborator
//! bundle for the duration of one call (a tick, a spawn, a command). All
//! gameplay mutation flows through it:
//!
//! - `lifecycle`: spawn, skill attachment, death and removal
//! - `combat`: damage/heal resolution with shields and ledger propagation
//! - `processor`: active-effect application, expiry and pulses
//! - `movement`: targeting, movement and base attacks
//! - `projectile` / `terrain`: free-standing entities
//! - `tick`: the per-frame driver that orders all of the above
mod combat;
mod events;
mod lifecycle;
mod movement;
mod processor;
mod projectile;
mod terrain;
mod tick;

pub use combat::{DamageOutcome, DamageSource};
pub use tick::TickReport;
pub use lifecycle::SpawnError;
pub use projectile::area_falloff;

use crate::env::{
    BattleEnv, Disposable, FxError, FxTarget, IssueSeverity, SoundCue, SoundSpec,
    ValidationIssue, compute_seed,
};
use crate::error::BattleError;
use crate::state::{UnitId, Vec2, World};

/// Fallback visual ids used when a unit type does not configure one.
pub mod default_fx {
    pub const DAMAGE: &str = "hit";
    pub const HEAL: &str = "heal";
    pub const DEATH: &str = "death";
    pub const SPAWN: &str = "spawn";
}

pub struct BattleEngine<'a> {
    pub(crate) world: &'a mut World,
    pub(crate) env: BattleEnv<'a>,
}

impl<'a> BattleEngine<'a> {
    pub fn new(world: &'a mut World, env: BattleEnv<'a>) -> Self {
        Self { world, env }
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn env(&self) -> BattleEnv<'a> {
        self.env
    }

    // ===== diagnostics =====

    pub(crate) fn report(
        &self,
        source_id: &str,
        message: impl Into<String>,
        severity: IssueSeverity,
        unit: Option<UnitId>,
    ) {
        let issue = match severity {
            IssueSeverity::Warning => ValidationIssue::warning(source_id, message),
            IssueSeverity::Error => ValidationIssue::error(source_id, message),
        }
        .with_context(self.world.issue_context(unit));
        self.env.diagnostics().report(issue);
    }

    pub(crate) fn report_error<E: BattleError>(
        &self,
        source_id: &str,
        error: &E,
        unit: Option<UnitId>,
    ) {
        let severity = if error.severity().is_error() {
            IssueSeverity::Error
        } else {
            IssueSeverity::Warning
        };
        self.report(
            source_id,
            format!("[{}] {}", error.error_code(), error),
            severity,
            unit,
        );
    }

    // ===== presentation =====

    pub(crate) fn unit_fx_target(&self, unit: UnitId) -> Option<FxTarget> {
        self.world.unit(unit).map(|u| FxTarget::Unit {
            id: u.id,
            position: u.position,
        })
    }

    /// Starts a visual and hands back its cleanup. Failures degrade to a no-op.
    pub(crate) fn start_fx(&self, id: Option<&str>, target: FxTarget) -> Disposable {
        let Some(id) = id else {
            return Disposable::noop();
        };
        match self.env.fx().apply_fx(id, target) {
            Ok(handle) => handle,
            Err(FxError::Unknown(_)) => {
                tracing::debug!(target: "battle_core::fx", fx = id, "unregistered visual effect");
                Disposable::noop()
            }
            Err(err) => {
                let unit = match target {
                    FxTarget::Unit { id, .. } => Some(id),
                    FxTarget::Point(_) => None,
                };
                self.report_error(id, &err, unit);
                Disposable::noop()
            }
        }
    }

    /// Fire-and-forget visual; its lifetime belongs to the presentation layer.
    pub(crate) fn flash_fx(&self, id: Option<&str>, target: FxTarget) {
        drop(self.start_fx(id, target));
    }

    /// Disposes a handle, reporting a failure instead of propagating it.
    pub(crate) fn dispose(&self, source_id: &str, handle: &mut Disposable, unit: Option<UnitId>) {
        if let Err(err) = handle.dispose() {
            self.report_error(source_id, &err, unit);
        }
    }

    pub(crate) fn play_sound(&self, cue: SoundCue, spec: Option<&SoundSpec>, at: Vec2) {
        match spec {
            Some(spec) => self.env.fx().play_sound(cue, spec, at),
            None => self.env.fx().play_sound(cue, &SoundSpec::fallback(cue), at),
        }
    }

    // ===== randomness =====

    pub(crate) fn roll_seed(&mut self, unit: UnitId, context: u32) -> u64 {
        let nonce = self.world.next_roll_nonce();
        compute_seed(self.world.config.seed, nonce, unit.raw(), context)
    }
}
