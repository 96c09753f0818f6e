//! Resolved effect definitions.
//!
//! Authored effects are loosely shaped records. They are resolved once, at
//! load time, into an [`EffectDefinition`] whose [`EffectKind`] says exactly
//! what the effect does; the per-tick code never inspects field presence.
use bitflags::bitflags;

use crate::state::Millis;

/// Unit stats that effects can modify.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum StatKind {
    Damage,
    Speed,
    AttackRange,
    AttackCooldown,
}

/// One stat modification, optionally carrying a shield.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDelta {
    pub stat: StatKind,
    pub value: f32,
    pub shield_amount: Option<f32>,
}

impl StatDelta {
    pub fn new(stat: StatKind, value: f32) -> Self {
        Self {
            stat,
            value,
            shield_amount: None,
        }
    }

    #[must_use]
    pub fn with_shield(mut self, amount: f32) -> Self {
        self.shield_amount = Some(amount);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Single stat modification.
    Stat(StatDelta),
    /// Several stat modifications applied as one instance.
    MultiStat(Vec<StatDelta>),
    /// Heal and/or damage. Pulses when a pulse interval is set, otherwise
    /// lands once on application.
    Direct { heal: f32, damage: f32 },
    /// Applying this effect applies `target_effect_id` instead (auras and
    /// terrain use it to hand out a different effect to each target).
    Forwarding { target_effect_id: String },
    /// No gameplay payload of its own: a pure shield or visual carrier.
    Marker,
}

bitflags! {
    /// Target-type filter parsed from `"allies,enemies,self"` lists.
    ///
    /// An empty set means "every unit in range".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TargetFlags: u8 {
        const ALLIES = 1 << 0;
        const ENEMIES = 1 << 1;
        const SELF = 1 << 2;
    }
}

impl TargetFlags {
    /// Parses a comma separated token list. Unknown tokens are returned as `Err`.
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut flags = Self::empty();
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            flags |= match token.to_ascii_lowercase().as_str() {
                "allies" | "ally" => Self::ALLIES,
                "enemies" | "enemy" => Self::ENEMIES,
                "self" => Self::SELF,
                "all" => Self::ALLIES | Self::ENEMIES | Self::SELF,
                _ => return Err(token.to_string()),
            };
        }
        Ok(flags)
    }

    pub fn is_untyped(self) -> bool {
        self.is_empty()
    }
}

/// Visual effect ids for the three phases of an effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FxPhases {
    pub start: Option<String>,
    pub continuous: Option<String>,
    pub end: Option<String>,
}

impl FxPhases {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.continuous.is_none() && self.end.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub id: String,
    pub kind: EffectKind,
    /// `None` never expires.
    pub duration_ms: Option<Millis>,
    pub pulse_interval_ms: Option<Millis>,
    pub shield_amount: Option<f32>,
    pub target_fx: FxPhases,
    pub source_fx: FxPhases,
    pub aura_radius: Option<f32>,
    pub targets: TargetFlags,
    /// Spawned as a terrain effect at an impact point instead of on a unit.
    pub no_unit: bool,
}

impl EffectDefinition {
    pub fn new(id: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            kind,
            duration_ms: None,
            pulse_interval_ms: None,
            shield_amount: None,
            target_fx: FxPhases::default(),
            source_fx: FxPhases::default(),
            aura_radius: None,
            targets: TargetFlags::empty(),
            no_unit: false,
        }
    }

    pub fn stat(id: impl Into<String>, stat: StatKind, value: f32) -> Self {
        Self::new(id, EffectKind::Stat(StatDelta::new(stat, value)))
    }

    pub fn multi_stat(id: impl Into<String>, deltas: Vec<StatDelta>) -> Self {
        Self::new(id, EffectKind::MultiStat(deltas))
    }

    pub fn heal(id: impl Into<String>, amount: f32) -> Self {
        Self::new(
            id,
            EffectKind::Direct {
                heal: amount,
                damage: 0.0,
            },
        )
    }

    pub fn damage(id: impl Into<String>, amount: f32) -> Self {
        Self::new(
            id,
            EffectKind::Direct {
                heal: 0.0,
                damage: amount,
            },
        )
    }

    pub fn forwarding(id: impl Into<String>, target_effect_id: impl Into<String>) -> Self {
        Self::new(
            id,
            EffectKind::Forwarding {
                target_effect_id: target_effect_id.into(),
            },
        )
    }

    pub fn shield(id: impl Into<String>, amount: f32) -> Self {
        Self::new(id, EffectKind::Marker).with_shield(amount)
    }

    #[must_use]
    pub fn with_duration(mut self, duration_ms: Millis) -> Self {
        self.duration_ms = (duration_ms >= 0.0).then_some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_pulse(mut self, interval_ms: Millis) -> Self {
        self.pulse_interval_ms = Some(interval_ms);
        self
    }

    #[must_use]
    pub fn with_shield(mut self, amount: f32) -> Self {
        self.shield_amount = Some(amount);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: TargetFlags) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_aura_radius(mut self, radius: f32) -> Self {
        self.aura_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_target_fx(mut self, phases: FxPhases) -> Self {
        self.target_fx = phases;
        self
    }

    #[must_use]
    pub fn with_source_fx(mut self, phases: FxPhases) -> Self {
        self.source_fx = phases;
        self
    }

    #[must_use]
    pub fn anchored_to_ground(mut self) -> Self {
        self.no_unit = true;
        self
    }

    /// Sum of deltas this effect contributes to `stat`.
    pub fn stat_delta(&self, stat: StatKind) -> f32 {
        match &self.kind {
            EffectKind::Stat(delta) if delta.stat == stat => delta.value,
            EffectKind::MultiStat(deltas) => deltas
                .iter()
                .filter(|delta| delta.stat == stat)
                .map(|delta| delta.value)
                .sum(),
            _ => 0.0,
        }
    }

    /// Shield carried directly or nested inside multi-stat entries.
    pub fn shield_total(&self) -> f32 {
        let nested: f32 = match &self.kind {
            EffectKind::Stat(delta) => delta.shield_amount.unwrap_or(0.0),
            EffectKind::MultiStat(deltas) => deltas
                .iter()
                .filter_map(|delta| delta.shield_amount)
                .sum(),
            _ => 0.0,
        };
        self.shield_amount.unwrap_or(0.0) + nested
    }

    pub fn has_shield(&self) -> bool {
        self.shield_amount.is_some()
            || match &self.kind {
                EffectKind::Stat(delta) => delta.shield_amount.is_some(),
                EffectKind::MultiStat(deltas) => {
                    deltas.iter().any(|delta| delta.shield_amount.is_some())
                }
                _ => false,
            }
    }

    /// Heal/damage amounts when this is a direct effect.
    pub fn direct_amounts(&self) -> Option<(f32, f32)> {
        match self.kind {
            EffectKind::Direct { heal, damage } => Some((heal, damage)),
            _ => None,
        }
    }

    /// Direct effect with a pulse cadence.
    pub fn is_pulsing(&self) -> bool {
        self.direct_amounts().is_some() && self.pulse_interval_ms.is_some()
    }

    /// Direct effect that lands once and is never stored.
    pub fn is_instant(&self) -> bool {
        self.direct_amounts().is_some() && self.pulse_interval_ms.is_none()
    }

    pub fn forwards_to(&self) -> Option<&str> {
        match &self.kind {
            EffectKind::Forwarding { target_effect_id } => Some(target_effect_id),
            _ => None,
        }
    }
}
