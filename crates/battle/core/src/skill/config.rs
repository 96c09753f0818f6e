//! Authored skill configuration.
use crate::env::{Appearance, AttackStyle, SoundSpec};
use crate::state::Millis;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SkillKind {
    Aura,
    Buff,
    Debuff,
    Transform,
    Summon,
    Projectile,
    Teleport,
}

/// Trigger conditions. Discrete triggers are independent and may be combined.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TriggerConfig {
    pub on_spawn: bool,
    pub on_attack: bool,
    pub on_attack_once: bool,
    pub on_get_attacked: bool,
    pub on_death: bool,
    pub interval: Option<Millis>,
    pub chance: Option<f32>,
    /// Fraction of max health at or below which the skill fires once.
    pub health_threshold: Option<f32>,
}

impl TriggerConfig {
    /// Any trigger other than the interval, excluding on-death.
    ///
    /// An interval configured alongside one of these is only honoured after a
    /// health threshold has fired; otherwise it is ignored.
    pub fn has_discrete(&self) -> bool {
        self.on_spawn
            || self.on_attack
            || self.on_attack_once
            || self.on_get_attacked
            || self.health_threshold.is_some()
    }

    /// Triggers delivered through the event bus.
    pub fn is_event_driven(&self) -> bool {
        self.on_attack || self.on_attack_once || self.on_get_attacked || self.on_death
    }

    pub fn is_pure_interval(&self) -> bool {
        self.interval.is_some() && !self.has_discrete()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_discrete() && !self.on_death && self.interval.is_none()
    }

    #[must_use]
    pub fn on_spawn() -> Self {
        Self {
            on_spawn: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn every(interval: Millis) -> Self {
        Self {
            interval: Some(interval),
            ..Self::default()
        }
    }
}

/// `suicide: true` uses the per-kind default delay, a number is a delay in ms.
/// `false`, `0` and NaN disable it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SuicideSpec {
    Flag(bool),
    DelayMs(f64),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillFx {
    pub start: Option<String>,
    pub end: Option<String>,
    pub continuous: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillSounds {
    pub start: Option<SoundSpec>,
    pub end: Option<SoundSpec>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ProjectileConfig {
    /// Distance per reference frame.
    pub speed: f32,
    pub max_distance: Option<f32>,
    /// Falls back to the caster's modified damage.
    pub damage: Option<f32>,
    pub count: u32,
    /// Fan width in degrees.
    pub spread_angle: f32,
    pub area_radius: f32,
    pub affect_allies: bool,
    pub affect_enemies: bool,
    /// Target-type list; a list without `enemies` aims at allies.
    pub target_type: Option<String>,
    /// Secondary effect ids applied on impact.
    pub effects: Vec<String>,
    pub impact_fx: Option<String>,
    pub size: f32,
    pub sprite: Option<String>,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            max_distance: None,
            damage: None,
            count: 1,
            spread_angle: 0.0,
            area_radius: 0.0,
            affect_allies: false,
            affect_enemies: true,
            target_type: None,
            effects: Vec::new(),
            impact_fx: None,
            size: 4.0,
            sprite: None,
        }
    }
}

/// Summoned unit parameters. Each stat resolves explicit value, then the
/// inherit flag, then half of the caster's value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SummonProperties {
    pub summon_count: u32,
    /// Lifetime in ms; `-1` keeps the summon until it dies.
    pub summon_duration: f64,
    /// Unit type to spawn; its skills come along. Without it the summon is a
    /// plain fighter derived from the caster.
    pub unit_type: Option<String>,
    pub health: Option<f32>,
    pub inherit_health: bool,
    pub damage: Option<f32>,
    pub inherit_damage: bool,
    pub speed: Option<f32>,
    pub inherit_speed: bool,
    pub graphics: Option<Appearance>,
    pub inherit_graphics: bool,
    pub attack_type: Option<AttackStyle>,
    pub inherit_attack_type: bool,
    pub attack_range: Option<f32>,
    pub inherit_attack_range: bool,
}

impl Default for SummonProperties {
    fn default() -> Self {
        Self {
            summon_count: 1,
            summon_duration: -1.0,
            unit_type: None,
            health: None,
            inherit_health: false,
            damage: None,
            inherit_damage: false,
            speed: None,
            inherit_speed: false,
            graphics: None,
            inherit_graphics: false,
            attack_type: None,
            inherit_attack_type: false,
            attack_range: None,
            inherit_attack_range: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformConfig {
    pub sprite: Option<String>,
    pub frames: Vec<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Teleport destination modes accepted by validation. Placement is uniform
/// random regardless of the mode.
pub const TARGET_SELECTIONS: &[&str] = &[
    "RANDOM",
    "NEAREST_ENEMY",
    "FARTHEST_ENEMY",
    "NEAREST_ALLY",
    "LOWEST_HEALTH_ENEMY",
];

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SkillConfig {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: SkillKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger: TriggerConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_effect_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fx: SkillFx,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sounds: SkillSounds,
    #[cfg_attr(feature = "serde", serde(default))]
    pub suicide: Option<SuicideSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub projectile: Option<ProjectileConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub summon_properties: Option<SummonProperties>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transform: Option<TransformConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_selection: Option<String>,
    /// Top-level keys the loader did not recognise; surfaced as warnings.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub unknown_fields: Vec<String>,
}

impl SkillConfig {
    /// Top-level keys understood by the loader.
    pub const KNOWN_FIELDS: &'static [&'static str] = &[
        "name",
        "type",
        "description",
        "trigger",
        "skillEffectId",
        "fx",
        "sounds",
        "suicide",
        "projectile",
        "summonProperties",
        "transform",
        "targetSelection",
    ];

    pub fn new(name: impl Into<String>, kind: SkillKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            trigger: TriggerConfig::default(),
            skill_effect_id: None,
            fx: SkillFx::default(),
            sounds: SkillSounds::default(),
            suicide: None,
            projectile: None,
            summon_properties: None,
            transform: None,
            target_selection: None,
            unknown_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerConfig) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect_id: impl Into<String>) -> Self {
        self.skill_effect_id = Some(effect_id.into());
        self
    }

    #[must_use]
    pub fn with_projectile(mut self, projectile: ProjectileConfig) -> Self {
        self.projectile = Some(projectile);
        self
    }

    #[must_use]
    pub fn with_summon(mut self, summon: SummonProperties) -> Self {
        self.summon_properties = Some(summon);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = Some(transform);
        self
    }

    #[must_use]
    pub fn with_suicide(mut self, suicide: SuicideSpec) -> Self {
        self.suicide = Some(suicide);
        self
    }

    /// Delay before the owner kills itself, if configured.
    pub fn suicide_delay(&self, default_ms: Millis) -> Option<Millis> {
        match self.suicide? {
            SuicideSpec::Flag(true) => Some(default_ms),
            SuicideSpec::Flag(false) => None,
            SuicideSpec::DelayMs(ms) if ms == 0.0 || ms.is_nan() => None,
            SuicideSpec::DelayMs(ms) if ms.is_finite() && ms > 0.0 => Some(ms),
            SuicideSpec::DelayMs(_) => Some(default_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(spec: SuicideSpec) -> Option<Millis> {
        SkillConfig::new("pyre", SkillKind::Buff)
            .with_suicide(spec)
            .suicide_delay(300.0)
    }

    #[test]
    fn zero_delay_disables_suicide() {
        assert_eq!(delay(SuicideSpec::DelayMs(0.0)), None);
        assert_eq!(delay(SuicideSpec::DelayMs(f64::NAN)), None);
        assert_eq!(delay(SuicideSpec::Flag(false)), None);
    }

    #[test]
    fn numeric_and_flag_delays() {
        assert_eq!(delay(SuicideSpec::DelayMs(750.0)), Some(750.0));
        assert_eq!(delay(SuicideSpec::DelayMs(-5.0)), Some(300.0));
        assert_eq!(delay(SuicideSpec::Flag(true)), Some(300.0));
        assert_eq!(SkillConfig::new("pyre", SkillKind::Buff).suicide_delay(300.0), None);
    }
}
