/// Battle configuration constants and tunable parameters.
///
/// Every duration is expressed in milliseconds of game time (see
/// [`crate::state::GameClock`]); distances are arena units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct BattleConfig {
    /// Arena width. Units are clamped into `[0, width]`.
    pub arena_width: f32,
    /// Arena height. Units are clamped into `[0, height]`.
    pub arena_height: f32,
    /// Speed multiplier applied when the world is created.
    pub initial_speed: f32,
    /// Base seed for every random roll in the match.
    pub seed: u64,
    /// Radius used by auras whose effect does not declare `auraRadius`.
    pub default_aura_radius: f32,
    /// Pulse spacing used when an aura wraps a direct effect without `pulseInterval`.
    pub default_pulse_interval_ms: f64,
    /// Lifetime of a melee strike visual.
    pub strike_visual_ms: f64,
    /// Distance from the caster at which summons are placed.
    pub summon_radius: f32,
    /// Travel cap for skill projectiles that omit `maxDistance`.
    pub projectile_max_distance: f32,
    /// Radius of terrain effects spawned from "no-unit" effects without `auraRadius`.
    pub terrain_radius: f32,
    /// Lifetime of terrain effects spawned from effects without `duration`.
    pub terrain_duration_ms: f64,
}

impl BattleConfig {
    // ===== clock =====
    pub const MIN_SPEED: f32 = 0.1;
    pub const MAX_SPEED: f32 = 3.0;
    /// Length of one reference frame; per-frame speeds are scaled against it.
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

    // ===== suicide delays per skill kind =====
    pub const AURA_SUICIDE_DELAY_MS: f64 = 500.0;
    pub const BUFF_SUICIDE_DELAY_MS: f64 = 300.0;
    pub const TRANSFORM_SUICIDE_DELAY_MS: f64 = 300.0;
    pub const DEBUFF_SUICIDE_DELAY_MS: f64 = 100.0;
    pub const TELEPORT_SUICIDE_DELAY_MS: f64 = 200.0;
    pub const SUMMON_SUICIDE_DELAY_MS: f64 = 100.0;
    pub const PROJECTILE_SUICIDE_DELAY_MS: f64 = 100.0;

    // ===== summons =====
    /// Longest summon chain; a summon of this depth cannot summon again.
    pub const MAX_SUMMON_DEPTH: u32 = 3;

    // ===== area effects =====
    /// Fraction of the impact damage dealt at the centre of an area burst.
    pub const AREA_FALLOFF_FACTOR: f32 = 0.6;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ARENA_WIDTH: f32 = 1200.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 800.0;
    pub const DEFAULT_AURA_RADIUS: f32 = 150.0;
    pub const DEFAULT_PULSE_INTERVAL_MS: f64 = 1000.0;
    pub const DEFAULT_STRIKE_VISUAL_MS: f64 = 200.0;
    pub const DEFAULT_SUMMON_RADIUS: f32 = 40.0;
    pub const DEFAULT_PROJECTILE_MAX_DISTANCE: f32 = 500.0;
    pub const DEFAULT_TERRAIN_RADIUS: f32 = 80.0;
    pub const DEFAULT_TERRAIN_DURATION_MS: f64 = 3000.0;

    pub fn new() -> Self {
        Self {
            arena_width: Self::DEFAULT_ARENA_WIDTH,
            arena_height: Self::DEFAULT_ARENA_HEIGHT,
            initial_speed: 1.0,
            seed: 0,
            default_aura_radius: Self::DEFAULT_AURA_RADIUS,
            default_pulse_interval_ms: Self::DEFAULT_PULSE_INTERVAL_MS,
            strike_visual_ms: Self::DEFAULT_STRIKE_VISUAL_MS,
            summon_radius: Self::DEFAULT_SUMMON_RADIUS,
            projectile_max_distance: Self::DEFAULT_PROJECTILE_MAX_DISTANCE,
            terrain_radius: Self::DEFAULT_TERRAIN_RADIUS,
            terrain_duration_ms: Self::DEFAULT_TERRAIN_DURATION_MS,
        }
    }

    #[must_use]
    pub fn with_arena(mut self, width: f32, height: f32) -> Self {
        self.arena_width = width;
        self.arena_height = height;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.initial_speed = speed;
        self
    }

    /// Clamps a requested speed multiplier into the supported range.
    pub fn clamp_speed(speed: f32) -> f32 {
        if speed.is_nan() {
            return 1.0;
        }
        speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
