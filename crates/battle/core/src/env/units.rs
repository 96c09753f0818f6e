//! Unit type templates.
use crate::env::SoundSpec;
use crate::state::Vec2;

/// How a unit delivers its base attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AttackStyle {
    #[default]
    Melee,
    Ranged,
}

/// Visual identity of a unit. Also the body used for collisions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Appearance {
    pub sprite: String,
    pub frames: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl Appearance {
    pub const DEFAULT_SIZE: f32 = 32.0;

    pub fn new(sprite: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            sprite: sprite.into(),
            frames: Vec::new(),
            width,
            height,
        }
    }

    /// Collision radius of the body.
    pub fn radius(&self) -> f32 {
        self.width.max(self.height) / 2.0
    }

    /// Same sprite at a fraction of the size.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            sprite: self.sprite.clone(),
            frames: self.frames.clone(),
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new("unit", Self::DEFAULT_SIZE, Self::DEFAULT_SIZE)
    }
}

/// Base attack parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AttackProfile {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub style: AttackStyle,
    /// Reach measured between body edges.
    pub range: f32,
    pub cooldown_ms: f64,
    /// Distance per reference frame for ranged attacks.
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub projectile_sprite: Option<String>,
}

impl AttackProfile {
    pub fn melee(range: f32, cooldown_ms: f64) -> Self {
        Self {
            style: AttackStyle::Melee,
            range,
            cooldown_ms,
            ..Self::default()
        }
    }

    pub fn ranged(range: f32, cooldown_ms: f64, projectile_speed: f32) -> Self {
        Self {
            style: AttackStyle::Ranged,
            range,
            cooldown_ms,
            projectile_speed,
            ..Self::default()
        }
    }
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            style: AttackStyle::Melee,
            range: 10.0,
            cooldown_ms: 1000.0,
            projectile_speed: 6.0,
            projectile_size: 4.0,
            projectile_sprite: None,
        }
    }
}

/// Visual effect ids a unit type plays at lifecycle moments.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitEffectRefs {
    pub spawn: Option<String>,
    pub continuous: Option<String>,
    pub attack: Option<String>,
    pub damage: Option<String>,
    pub death: Option<String>,
}

/// Sound specs a unit type plays. Missing entries fall back to built-in tones.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitSounds {
    pub attack: Option<SoundSpec>,
    pub death: Option<SoundSpec>,
    pub spawn: Option<SoundSpec>,
}

/// Template a unit is spawned from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct UnitTypeConfig {
    pub id: String,
    pub name: String,
    pub health: f32,
    pub damage: f32,
    /// Distance per reference frame.
    pub speed: f32,
    pub appearance: Appearance,
    pub attack: AttackProfile,
    pub skills: Vec<String>,
    pub effects: UnitEffectRefs,
    pub sounds: UnitSounds,
}

impl UnitTypeConfig {
    pub fn new(id: impl Into<String>, health: f32, damage: f32, speed: f32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            health,
            damage,
            speed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attack(mut self, attack: AttackProfile) -> Self {
        self.attack = attack;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    #[must_use]
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: UnitEffectRefs) -> Self {
        self.effects = effects;
        self
    }
}

impl Default for UnitTypeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            health: 100.0,
            damage: 10.0,
            speed: 1.0,
            appearance: Appearance::default(),
            attack: AttackProfile::default(),
            skills: Vec::new(),
            effects: UnitEffectRefs::default(),
            sounds: UnitSounds::default(),
        }
    }
}

/// Request to place a unit of a configured type into the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    pub unit_type: String,
    pub team: Option<crate::state::TeamId>,
    pub ai: Option<crate::state::AiId>,
    pub position: Vec2,
}

impl SpawnRequest {
    pub fn new(unit_type: impl Into<String>, position: Vec2) -> Self {
        Self {
            unit_type: unit_type.into(),
            team: None,
            ai: None,
            position,
        }
    }

    #[must_use]
    pub fn team(mut self, team: crate::state::TeamId) -> Self {
        self.team = Some(team);
        self
    }

    #[must_use]
    pub fn ai(mut self, ai: crate::state::AiId) -> Self {
        self.ai = Some(ai);
        self
    }
}
