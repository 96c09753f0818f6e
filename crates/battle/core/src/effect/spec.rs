//! Authored effect records and their one-time resolution.
use std::str::FromStr;

use super::definition::{
    EffectDefinition, EffectKind, FxPhases, StatDelta, StatKind, TargetFlags,
};
use crate::error::{BattleError, ErrorSeverity};

/// Tag that forces the multi-stat shape.
pub const MULTI_STAT_TAG: &str = "MULTI_STAT";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("effect has no id")]
    MissingId,

    #[error("effect '{effect}': unknown stat '{stat}'")]
    UnknownStat { effect: String, stat: String },

    #[error("effect '{effect}': stat '{stat}' has no value")]
    MissingValue { effect: String, stat: String },

    #[error("effect '{effect}': field '{field}' is not a finite number")]
    NonFinite { effect: String, field: &'static str },

    #[error("effect '{effect}': pulseInterval must be positive, got {value}")]
    InvalidPulseInterval { effect: String, value: f64 },

    #[error("effect '{effect}': unknown target type '{token}'")]
    UnknownTargetType { effect: String, token: String },

    #[error("effect '{effect}': unknown effectType '{tag}'")]
    UnknownEffectType { effect: String, tag: String },

    #[error("effect '{effect}': multi-stat effect lists no entries")]
    EmptyMultiStat { effect: String },

    #[error("effect '{effect}' has no recognizable shape")]
    NoShape { effect: String },
}

impl BattleError for DefinitionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingId => "EFFECT_MISSING_ID",
            Self::UnknownStat { .. } => "EFFECT_UNKNOWN_STAT",
            Self::MissingValue { .. } => "EFFECT_MISSING_VALUE",
            Self::NonFinite { .. } => "EFFECT_NON_FINITE",
            Self::InvalidPulseInterval { .. } => "EFFECT_INVALID_PULSE",
            Self::UnknownTargetType { .. } => "EFFECT_UNKNOWN_TARGET_TYPE",
            Self::UnknownEffectType { .. } => "EFFECT_UNKNOWN_TYPE",
            Self::EmptyMultiStat { .. } => "EFFECT_EMPTY_MULTI_STAT",
            Self::NoShape { .. } => "EFFECT_NO_SHAPE",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct StatDeltaSpec {
    pub stat: String,
    pub value: Option<f32>,
    pub shield_amount: Option<f32>,
}

/// Effect as authored. Field presence decides the resolved shape.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EffectSpec {
    /// Catalogs keyed by id may omit this; the loader fills it in.
    pub id: Option<String>,
    pub stat: Option<String>,
    pub value: Option<f32>,
    pub effects: Option<Vec<StatDeltaSpec>>,
    pub heal_amount: Option<f32>,
    pub damage_amount: Option<f32>,
    pub pulse_interval: Option<f64>,
    pub duration: Option<f64>,
    pub target_fx: Option<FxPhases>,
    pub source_fx: Option<FxPhases>,
    pub shield_amount: Option<f32>,
    pub target_effect_id: Option<String>,
    pub effect_type: Option<String>,
    pub aura_radius: Option<f32>,
    pub target_type: Option<String>,
    pub no_unit: bool,
}

fn finite(effect: &str, field: &'static str, value: f32) -> Result<f32, DefinitionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DefinitionError::NonFinite {
            effect: effect.to_string(),
            field,
        })
    }
}

fn parse_stat(effect: &str, stat: &str) -> Result<StatKind, DefinitionError> {
    StatKind::from_str(stat.trim()).map_err(|_| DefinitionError::UnknownStat {
        effect: effect.to_string(),
        stat: stat.to_string(),
    })
}

impl EffectSpec {
    /// Resolves the authored record into a tagged definition.
    ///
    /// Shape precedence: forwarding id, then multi-stat (tag or list), then
    /// single stat, then heal/damage, then a bare shield or visual marker.
    pub fn resolve(self) -> Result<EffectDefinition, DefinitionError> {
        let id = self
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(DefinitionError::MissingId)?;

        let multi_tagged = match self.effect_type.as_deref() {
            None => false,
            Some(tag) if tag.eq_ignore_ascii_case(MULTI_STAT_TAG) => true,
            Some(tag) => {
                return Err(DefinitionError::UnknownEffectType {
                    effect: id,
                    tag: tag.to_string(),
                });
            }
        };

        let kind = if let Some(target) = self.target_effect_id.clone() {
            EffectKind::Forwarding {
                target_effect_id: target,
            }
        } else if multi_tagged || self.effects.is_some() {
            let entries = self.effects.clone().unwrap_or_default();
            if entries.is_empty() {
                return Err(DefinitionError::EmptyMultiStat { effect: id });
            }
            let mut deltas = Vec::with_capacity(entries.len());
            for entry in entries {
                let stat = parse_stat(&id, &entry.stat)?;
                let value = entry.value.ok_or_else(|| DefinitionError::MissingValue {
                    effect: id.clone(),
                    stat: entry.stat.clone(),
                })?;
                let mut delta = StatDelta::new(stat, finite(&id, "effects.value", value)?);
                if let Some(shield) = entry.shield_amount {
                    delta = delta.with_shield(finite(&id, "effects.shieldAmount", shield)?);
                }
                deltas.push(delta);
            }
            EffectKind::MultiStat(deltas)
        } else if let Some(stat) = self.stat.as_deref() {
            let stat_kind = parse_stat(&id, stat)?;
            let value = self.value.ok_or_else(|| DefinitionError::MissingValue {
                effect: id.clone(),
                stat: stat.to_string(),
            })?;
            EffectKind::Stat(StatDelta::new(stat_kind, finite(&id, "value", value)?))
        } else if self.heal_amount.is_some() || self.damage_amount.is_some() {
            EffectKind::Direct {
                heal: finite(&id, "healAmount", self.heal_amount.unwrap_or(0.0))?.max(0.0),
                damage: finite(&id, "damageAmount", self.damage_amount.unwrap_or(0.0))?.max(0.0),
            }
        } else if self.shield_amount.is_some()
            || self.target_fx.as_ref().is_some_and(|fx| !fx.is_empty())
            || self.source_fx.as_ref().is_some_and(|fx| !fx.is_empty())
        {
            EffectKind::Marker
        } else {
            return Err(DefinitionError::NoShape { effect: id });
        };

        let pulse_interval_ms = match self.pulse_interval {
            Some(value) if !value.is_finite() || value <= 0.0 => {
                return Err(DefinitionError::InvalidPulseInterval { effect: id, value });
            }
            other => other,
        };

        let targets = match self.target_type.as_deref() {
            Some(list) => TargetFlags::parse(list).map_err(|token| {
                DefinitionError::UnknownTargetType {
                    effect: id.clone(),
                    token,
                }
            })?,
            None => TargetFlags::empty(),
        };

        let shield_amount = match self.shield_amount {
            Some(value) => Some(finite(&id, "shieldAmount", value)?),
            None => None,
        };
        let aura_radius = match self.aura_radius {
            Some(value) => Some(finite(&id, "auraRadius", value)?.max(0.0)),
            None => None,
        };

        Ok(EffectDefinition {
            id,
            kind,
            duration_ms: self.duration.filter(|d| d.is_finite() && *d >= 0.0),
            pulse_interval_ms,
            shield_amount,
            target_fx: self.target_fx.unwrap_or_default(),
            source_fx: self.source_fx.unwrap_or_default(),
            aura_radius,
            targets,
            no_unit: self.no_unit,
        })
    }
}

impl TryFrom<EffectSpec> for EffectDefinition {
    type Error = DefinitionError;

    fn try_from(spec: EffectSpec) -> Result<Self, Self::Error> {
        spec.resolve()
    }
}
