//! Effect definitions and the instances attached to units.
mod definition;
mod spec;

pub use definition::{EffectDefinition, EffectKind, FxPhases, StatDelta, StatKind, TargetFlags};
pub use spec::{DefinitionError, EffectSpec, MULTI_STAT_TAG, StatDeltaSpec};

use std::sync::Arc;

use crate::env::{Disposable, FxError};
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{Millis, UnitId};

/// Failure while advancing or applying one effect instance.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("effect '{effect}' produced a non-finite {field}")]
    NonFinite { effect: String, field: &'static str },

    #[error("effect '{effect}' forwards to unknown effect '{target}'")]
    ForwardTargetMissing { effect: String, target: String },

    #[error("effect '{effect}' forwards in a loop")]
    ForwardLoop { effect: String },

    #[error(transparent)]
    Fx(#[from] FxError),
}

impl BattleError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NonFinite { .. } => ErrorSeverity::Internal,
            Self::ForwardTargetMissing { .. } | Self::ForwardLoop { .. } => {
                ErrorSeverity::Validation
            }
            Self::Fx(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NonFinite { .. } => "EFFECT_NON_FINITE",
            Self::ForwardTargetMissing { .. } => "EFFECT_FORWARD_MISSING",
            Self::ForwardLoop { .. } => "EFFECT_FORWARD_LOOP",
            Self::Fx(err) => err.error_code(),
        }
    }
}

/// Who applied an effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectSource {
    pub unit: Option<UnitId>,
    pub skill: Option<String>,
}

impl EffectSource {
    pub fn unit(unit: UnitId) -> Self {
        Self {
            unit: Some(unit),
            skill: None,
        }
    }

    pub fn skill(unit: UnitId, skill: impl Into<String>) -> Self {
        Self {
            unit: Some(unit),
            skill: Some(skill.into()),
        }
    }
}

/// Effect instance living on a unit.
#[derive(Debug)]
pub struct ActiveEffect {
    pub definition: Arc<EffectDefinition>,
    pub source: EffectSource,
    /// Stamped on application, or lazily by the processor.
    pub started_at: Option<Millis>,
    pub last_pulse: Option<Millis>,
    /// Cleanup hook registered by whoever applied the effect.
    pub cleanup: Disposable,
    /// Continuous visual anchored on the target.
    pub target_fx: Disposable,
    /// Continuous visual anchored on the source.
    pub source_fx: Disposable,
}

impl ActiveEffect {
    pub fn new(definition: Arc<EffectDefinition>, source: EffectSource) -> Self {
        Self {
            definition,
            source,
            started_at: None,
            last_pulse: None,
            cleanup: Disposable::noop(),
            target_fx: Disposable::noop(),
            source_fx: Disposable::noop(),
        }
    }

    #[must_use]
    pub fn with_cleanup(mut self, cleanup: Disposable) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Disposes every handle, each independently. Returns the failures.
    pub fn dispose_all(&mut self) -> Vec<FxError> {
        [&mut self.cleanup, &mut self.target_fx, &mut self.source_fx]
            .into_iter()
            .filter_map(|handle| handle.dispose().err())
            .collect()
    }
}

/// Result of applying an effect to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Stored on the unit.
    Applied,
    /// Direct effect landed once; nothing was stored.
    Landed,
    /// An instance with the same id is already active: no-op.
    AlreadyActive,
    /// Target absent or dead.
    TargetMissing,
    /// Forwarding target could not be resolved.
    Unresolved,
}

impl ApplyOutcome {
    pub fn took_hold(self) -> bool {
        matches!(self, Self::Applied | Self::Landed)
    }
}
