//! Planar geometry for the arena.
use core::ops::{Add, Mul, Sub};

/// Position or direction in arena space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Bearing from `self` towards `other` in radians.
    pub fn bearing_to(self, other: Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Moves `self` towards `target` by at most `step`, never overshooting.
    pub fn step_towards(self, target: Self, step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= step || dist <= f32::EPSILON {
            target
        } else {
            self + delta.normalized() * step
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned playable area, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    /// Clamps `point` so that a body of half-extent `margin` stays inside.
    pub fn clamp(&self, point: Vec2, margin: f32) -> Vec2 {
        let margin_x = margin.min(self.width / 2.0).max(0.0);
        let margin_y = margin.min(self.height / 2.0).max(0.0);
        let x = if point.x.is_finite() { point.x } else { self.width / 2.0 };
        let y = if point.y.is_finite() { point.y } else { self.height / 2.0 };
        Vec2::new(
            x.clamp(margin_x, self.width - margin_x),
            y.clamp(margin_y, self.height - margin_y),
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}
