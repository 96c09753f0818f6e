//! Configuration checks shared by every skill kind.
//!
//! Validation only reports. Missing required blocks are errors, everything
//! else is a warning; activation decides separately whether it can proceed.
use crate::effect::TargetFlags;
use crate::env::IssueSeverity;

use super::config::SkillConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

impl SkillIssue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

pub(super) fn common(config: &SkillConfig) -> Vec<SkillIssue> {
    let mut issues = Vec::new();
    let trigger = &config.trigger;

    for field in &config.unknown_fields {
        issues.push(SkillIssue::warning(format!(
            "unknown field '{field}' on {} skill",
            config.kind
        )));
    }
    if trigger.is_empty() {
        issues.push(SkillIssue::warning("no trigger configured; the skill never fires"));
    }
    if let Some(interval) = trigger.interval
        && !(interval.is_finite() && interval > 0.0)
    {
        issues.push(SkillIssue::error(format!(
            "trigger.interval must be a positive number of ms, got {interval}"
        )));
    }
    if let Some(chance) = trigger.chance
        && !(0.0..=1.0).contains(&chance)
    {
        issues.push(SkillIssue::warning(format!(
            "trigger.chance {chance} is outside [0, 1]"
        )));
    }
    if let Some(threshold) = trigger.health_threshold
        && !(threshold > 0.0 && threshold <= 1.0)
    {
        issues.push(SkillIssue::warning(format!(
            "trigger.healthThreshold {threshold} is outside (0, 1]"
        )));
    }
    if trigger.interval.is_some() && trigger.health_threshold.is_none() && trigger.has_discrete() {
        issues.push(SkillIssue::warning(
            "trigger.interval is ignored next to onSpawn/onAttack/onAttackOnce/onGetAttacked",
        ));
    }
    if trigger.on_death && config.kind != super::SkillKind::Summon {
        issues.push(SkillIssue::warning(format!(
            "trigger.onDeath is only honoured by summon skills, not {}",
            config.kind
        )));
    }
    issues
}

/// `skillEffectId` is mandatory for aura, buff, debuff and transform.
pub(super) fn require_effect(config: &SkillConfig, issues: &mut Vec<SkillIssue>) {
    if config.skill_effect_id.as_deref().is_none_or(str::is_empty) {
        issues.push(SkillIssue::error(format!(
            "{} skill requires skillEffectId",
            config.kind
        )));
    }
}

pub(super) fn target_list(field: &str, list: Option<&str>, issues: &mut Vec<SkillIssue>) {
    if let Some(list) = list
        && let Err(token) = TargetFlags::parse(list)
    {
        issues.push(SkillIssue::warning(format!(
            "{field} contains unknown target type '{token}'"
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{SkillKind, TriggerConfig, validate_config};

    #[test]
    fn missing_effect_is_an_error() {
        let config = SkillConfig::new("rage", SkillKind::Buff).with_trigger(TriggerConfig::on_spawn());
        let issues = validate_config(&config);
        assert!(issues.iter().any(|issue| issue.is_error() && issue.message.contains("skillEffectId")));
    }

    #[test]
    fn interval_next_to_discrete_trigger_warns() {
        let trigger = TriggerConfig {
            on_attack: true,
            interval: Some(1000.0),
            ..TriggerConfig::default()
        };
        let config = SkillConfig::new("blink", SkillKind::Teleport).with_trigger(trigger);
        let issues = validate_config(&config);
        assert!(issues.iter().any(|issue| issue.message.contains("ignored")));
        assert!(issues.iter().all(|issue| !issue.is_error()));
    }

    #[test]
    fn unknown_fields_are_warnings() {
        let mut config = SkillConfig::new("blink", SkillKind::Teleport)
            .with_trigger(TriggerConfig::every(500.0));
        config.unknown_fields.push("cooldwon".into());
        let issues = validate_config(&config);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("cooldwon"));
    }
}
