//! Diagnostics sink for validation and runtime issues.
//!
//! Reporting is fire-and-forget: sinks never fail back into the simulation.
use parking_lot::Mutex;

use crate::state::{AiId, TeamId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IssueSeverity {
    Warning,
    Error,
}

impl IssueSeverity {
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Ownership context an issue is attributed to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IssueContext {
    pub ai_id: Option<AiId>,
    pub team_id: Option<TeamId>,
    pub ai_name: Option<String>,
    pub team_name: Option<String>,
    pub match_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationIssue {
    /// Skill name, effect id or unit type the issue concerns.
    pub source_id: String,
    pub message: String,
    pub severity: IssueSeverity,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn warning(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message: message.into(),
            severity: IssueSeverity::Warning,
            context: IssueContext::default(),
        }
    }

    pub fn error(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            ..Self::warning(source_id, message)
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: IssueContext) -> Self {
        self.context = context;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, issue: ValidationIssue);
}

/// Mirrors issues into the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => tracing::error!(
                target: "battle_core::diagnostics",
                source = %issue.source_id,
                team = ?issue.context.team_name,
                ai = ?issue.context.ai_name,
                "{}",
                issue.message
            ),
            IssueSeverity::Warning => tracing::warn!(
                target: "battle_core::diagnostics",
                source = %issue.source_id,
                team = ?issue.context.team_name,
                ai = ?issue.context.ai_name,
                "{}",
                issue.message
            ),
        }
    }
}

/// Collects issues in memory. Used by tests and by the runtime to batch
/// issues per frame.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    issues: Mutex<Vec<ValidationIssue>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.issues.lock().clone()
    }

    pub fn drain(&self) -> Vec<ValidationIssue> {
        core::mem::take(&mut *self.issues.lock())
    }

    pub fn errors(&self) -> Vec<ValidationIssue> {
        self.issues
            .lock()
            .iter()
            .filter(|issue| issue.is_error())
            .cloned()
            .collect()
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.issues
            .lock()
            .iter()
            .any(|issue| issue.message.contains(needle) || issue.source_id.contains(needle))
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn report(&self, issue: ValidationIssue) {
        self.issues.lock().push(issue);
    }
}
