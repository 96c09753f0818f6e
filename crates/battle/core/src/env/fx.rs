//! Presentation collaborator: visual effects and sound cues.
//!
//! Rendering and audio live outside the simulation. The engine asks the
//! [`FxOracle`] to start an effect and receives a [`Disposable`] it must
//! dispose exactly once when the effect ends. One-shot effects return
//! [`Disposable::noop`].
use core::fmt;

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{UnitId, Vec2};

/// Failure raised by the presentation layer.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FxError {
    #[error("visual effect '{0}' is not registered")]
    Unknown(String),

    #[error("visual effect '{id}' failed: {reason}")]
    Failed { id: String, reason: String },

    #[error("cleanup of '{id}' failed: {reason}")]
    Cleanup { id: String, reason: String },
}

impl BattleError for FxError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unknown(_) => ErrorSeverity::Validation,
            Self::Failed { .. } | Self::Cleanup { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "FX_UNKNOWN",
            Self::Failed { .. } => "FX_FAILED",
            Self::Cleanup { .. } => "FX_CLEANUP_FAILED",
        }
    }
}

type DisposeFn = Box<dyn FnOnce() -> Result<(), FxError> + Send>;

/// Single-use cleanup capability.
///
/// Every effect constructor returns one. Disposing runs the stored cleanup at
/// most once; further calls are no-ops.
#[derive(Default)]
pub struct Disposable {
    dispose: Option<DisposeFn>,
}

impl Disposable {
    pub fn new(dispose: impl FnOnce() -> Result<(), FxError> + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// True while the cleanup has not run yet.
    pub fn is_armed(&self) -> bool {
        self.dispose.is_some()
    }

    pub fn dispose(&mut self) -> Result<(), FxError> {
        match self.dispose.take() {
            Some(dispose) => dispose(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Where a visual effect is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FxTarget {
    Unit { id: UnitId, position: Vec2 },
    Point(Vec2),
}

impl FxTarget {
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Unit { position, .. } | Self::Point(position) => *position,
        }
    }
}

/// Moment a sound is played for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SoundCue {
    SkillStart,
    SkillEnd,
    Attack,
    Death,
    Spawn,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Tone parameters handed to the audio collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SoundSpec {
    pub frequency: f32,
    pub duration_ms: f32,
    pub volume: f32,
    pub waveform: Waveform,
}

impl SoundSpec {
    /// Built-in tone used when content omits a sound for `cue`.
    pub fn fallback(cue: SoundCue) -> Self {
        let (frequency, duration_ms, volume, waveform) = match cue {
            SoundCue::SkillStart => (660.0, 150.0, 0.3, Waveform::Sine),
            SoundCue::SkillEnd => (440.0, 120.0, 0.25, Waveform::Sine),
            SoundCue::Attack => (220.0, 80.0, 0.2, Waveform::Square),
            SoundCue::Death => (110.0, 400.0, 0.35, Waveform::Sawtooth),
            SoundCue::Spawn => (520.0, 200.0, 0.25, Waveform::Triangle),
        };
        Self {
            frequency,
            duration_ms,
            volume,
            waveform,
        }
    }
}

impl Default for SoundSpec {
    fn default() -> Self {
        Self::fallback(SoundCue::SkillStart)
    }
}

/// Visual/audio effect registry.
pub trait FxOracle: Send + Sync {
    /// Starts visual effect `id` at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FxError::Unknown`] for unregistered ids and
    /// [`FxError::Failed`] when the effect could not start.
    fn apply_fx(&self, id: &str, target: FxTarget) -> Result<Disposable, FxError>;

    fn play_sound(&self, cue: SoundCue, spec: &SoundSpec, at: Vec2);
}

/// Presentation sink that renders nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFx;

impl FxOracle for NullFx {
    fn apply_fx(&self, _id: &str, _target: FxTarget) -> Result<Disposable, FxError> {
        Ok(Disposable::noop())
    }

    fn play_sound(&self, _cue: SoundCue, _spec: &SoundSpec, _at: Vec2) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn dispose_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut handle = Disposable::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert!(handle.is_armed());
        handle.dispose().unwrap();
        handle.dispose().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_armed());
    }

    #[test]
    fn noop_dispose_is_ok() {
        assert!(Disposable::noop().dispose().is_ok());
    }
}
