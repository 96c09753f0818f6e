//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`SpawnError`, `SkillError`, `EffectError`, ...) are
//! defined next to the components that raise them. They all implement
//! [`BattleError`] so callers can route them uniformly into diagnostics.
//!
//! Nothing in the simulation unwinds a tick because of one bad piece of
//! content: errors are classified, reported through the diagnostics sink and
//! the offending skill or effect is dropped locally.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later.
    ///
    /// Examples: target already dead, unit removed before a deferred task ran
    Recoverable,

    /// Invalid authored content; reported and skipped.
    ///
    /// Examples: missing effect id, unknown stat name
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    ///
    /// Examples: skill slot vanished mid-update
    Internal,

    /// The match cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }

    /// Whether diagnostics should flag this as an error rather than a warning.
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, e.g. `SKILL_EFFECT_NOT_FOUND`.
    fn error_code(&self) -> &'static str;

    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}
