//! Projectile motion and impact resolution.
//!
//! Base ranged attacks keep their projectiles in the world; projectile skills
//! keep theirs in the skill state. Both advance through
//! [`BattleEngine::advance_projectile`].
use crate::config::BattleConfig;
use crate::effect::EffectSource;
use crate::env::FxTarget;
use crate::state::{GameClock, Projectile, UnitId, Vec2, same_team};

use super::{BattleEngine, DamageSource};

/// Damage dealt to a secondary target `distance` away from an impact.
///
/// `floor(damage * (1 - distance / radius) * 0.6)`, zero at or beyond the
/// radius.
pub fn area_falloff(damage: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || !distance.is_finite() || distance >= radius || damage <= 0.0 {
        return 0.0;
    }
    let scaled = damage * (1.0 - distance.max(0.0) / radius) * BattleConfig::AREA_FALLOFF_FACTOR;
    scaled.floor().max(0.0)
}

impl BattleEngine<'_> {
    /// Moves one projectile by the current frame and resolves a collision.
    ///
    /// Returns `false` when the projectile is spent: it hit something, left
    /// the arena or exceeded its range.
    pub(crate) fn advance_projectile(&mut self, projectile: &mut Projectile) -> bool {
        let frames = GameClock::frames_in(self.world.frame_delta);
        let step = projectile.velocity * frames;
        let start = projectile.position;

        if let Some((hit, point)) = self.first_collision(projectile, start, step) {
            self.resolve_impact(projectile, hit, point);
            return false;
        }

        projectile.position = start + step;
        projectile.traveled += step.length();
        self.world.is_in_bounds(projectile.position)
            && projectile.traveled <= projectile.max_distance
    }

    fn qualifies(&self, projectile: &Projectile, unit: UnitId) -> bool {
        let Some(target) = self.world.unit(unit).filter(|u| u.is_alive()) else {
            return false;
        };
        if target.id == projectile.source {
            return false;
        }
        if same_team(projectile.source_team, target.team) {
            projectile.affect_allies
        } else {
            projectile.affect_enemies
        }
    }

    /// Earliest qualifying unit touched by the swept segment `start..start+step`.
    fn first_collision(
        &self,
        projectile: &Projectile,
        start: Vec2,
        step: Vec2,
    ) -> Option<(UnitId, Vec2)> {
        let length_sq = step.x * step.x + step.y * step.y;
        self.world
            .units()
            .filter(|unit| self.qualifies(projectile, unit.id))
            .filter_map(|unit| {
                let t = if length_sq <= f32::EPSILON {
                    0.0
                } else {
                    let to_unit = unit.position - start;
                    ((to_unit.x * step.x + to_unit.y * step.y) / length_sq).clamp(0.0, 1.0)
                };
                let closest = start + step * t;
                (closest.distance(unit.position) <= unit.radius() + projectile.size)
                    .then_some((t, unit.id, closest))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id, point)| (id, point))
    }

    /// Direct hit, impact visual, secondary effects and area falloff.
    pub(crate) fn resolve_impact(&mut self, projectile: &Projectile, hit: UnitId, point: Vec2) {
        let source = DamageSource::with_team(projectile.source, projectile.source_team);
        let effect_source = EffectSource {
            unit: Some(projectile.source),
            skill: projectile.skill.clone(),
        };

        self.apply_damage(hit, projectile.damage, source, projectile.affect_allies);
        self.flash_fx(projectile.impact_fx.as_deref(), FxTarget::Point(point));

        for effect in &projectile.effects {
            if effect.no_unit {
                self.spawn_terrain(
                    effect,
                    point,
                    Some(projectile.source),
                    projectile.source_team,
                );
            } else {
                self.apply_effect(hit, effect.clone(), effect_source.clone());
            }
        }

        if projectile.area_radius <= 0.0 {
            return;
        }
        let splashed: Vec<(UnitId, f32)> = self
            .world
            .units_in_range(point, projectile.area_radius)
            .into_iter()
            .filter(|id| *id != hit && self.qualifies(projectile, *id))
            .filter_map(|id| self.world.unit(id).map(|u| (id, u.position.distance(point))))
            .collect();

        for (unit, distance) in splashed {
            let damage = area_falloff(projectile.damage, distance, projectile.area_radius);
            if damage > 0.0 {
                self.apply_damage(unit, damage, source, projectile.affect_allies);
            }
            for effect in projectile.effects.iter().filter(|e| !e.no_unit) {
                self.apply_effect(unit, effect.clone(), effect_source.clone());
            }
        }
    }

    /// Advances the free-standing projectiles owned by the world.
    pub(crate) fn advance_world_projectiles(&mut self) {
        let mut projectiles = core::mem::take(&mut self.world.projectiles);
        projectiles.retain_mut(|projectile| self.advance_projectile(projectile));
        // Impacts may have spawned new projectiles (none today, but keep them).
        projectiles.append(&mut self.world.projectiles);
        self.world.projectiles = projectiles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_matches_formula() {
        assert_eq!(area_falloff(100.0, 0.0, 50.0), 60.0);
        assert_eq!(area_falloff(100.0, 25.0, 50.0), 30.0);
        assert_eq!(area_falloff(10.0, 10.0, 50.0), 4.0);
    }

    #[test]
    fn falloff_reaches_zero_at_radius() {
        assert_eq!(area_falloff(100.0, 50.0, 50.0), 0.0);
        assert_eq!(area_falloff(100.0, 80.0, 50.0), 0.0);
        assert_eq!(area_falloff(100.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn falloff_decreases_with_distance() {
        let mut previous = f32::INFINITY;
        for step in 0..10 {
            let damage = area_falloff(1000.0, step as f32 * 10.0, 100.0);
            assert!(damage < previous);
            previous = damage;
        }
    }
}
