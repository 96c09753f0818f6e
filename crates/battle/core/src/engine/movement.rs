//! Targeting, movement and base attacks.
//!
//! Distances are surface to surface: a unit attacks once the gap between its
//! edge and the target's edge is within its modified attack range.
use crate::effect::StatKind;
use crate::env::{AttackStyle, FxTarget, SoundCue};
use crate::event::EventPayload;
use crate::state::{GameClock, MeleeStrike, Projectile, Relation, UnitId, Vec2};

use super::{BattleEngine, DamageSource};

impl BattleEngine<'_> {
    /// Base per-frame behaviour of one unit: pick a target, close the gap,
    /// attack when the cooldown allows.
    pub(crate) fn update_unit_base(&mut self, id: UnitId) {
        let Some(unit) = self.world.unit(id).filter(|u| u.is_alive()) else {
            return;
        };
        let keep = unit
            .target
            .and_then(|t| self.world.unit(t))
            .filter(|t| t.is_alive())
            .filter(|t| Relation::between((id, unit.team), (t.id, t.team)) == Relation::Enemy)
            .map(|t| t.id);
        let Some(target) = keep.or_else(|| self.world.nearest_enemy(id)) else {
            if let Some(unit) = self.world.units.get_mut(&id) {
                unit.target = None;
            }
            return;
        };
        if let Some(unit) = self.world.units.get_mut(&id) {
            unit.target = Some(target);
        }

        let (Some(unit), Some(enemy)) = (self.world.unit(id), self.world.unit(target)) else {
            return;
        };
        let range = unit.modified_stat(StatKind::AttackRange).max(0.0);
        let gap = unit.position.distance(enemy.position) - unit.radius() - enemy.radius();

        if gap > range {
            let speed = unit.modified_stat(StatKind::Speed).max(0.0);
            let step = (speed * GameClock::frames_in(self.world.frame_delta)).min(gap - range);
            let next = unit.position.step_towards(enemy.position, step);
            let next = self.world.bounds().clamp(next, unit.radius());
            if let Some(unit) = self.world.units.get_mut(&id) {
                unit.position = next;
            }
            return;
        }

        let now = self.world.now();
        let cooldown = f64::from(unit.modified_stat(StatKind::AttackCooldown).max(0.0));
        let ready = unit.last_attack_at.is_none_or(|last| now - last >= cooldown);
        if ready {
            self.perform_attack(id, target);
        }
    }

    /// Swings at or shoots `target`. Emits `Attack` on the attacker first so
    /// listeners may adjust the damage.
    pub fn perform_attack(&mut self, attacker: UnitId, target: UnitId) {
        let now = self.world.now();
        let Some(unit) = self.world.units.get_mut(&attacker) else {
            return;
        };
        unit.last_attack_at = Some(now);
        let damage = unit.modified_stat(StatKind::Damage).max(0.0);

        let mut payload = EventPayload::attack(attacker, target, damage);
        self.emit(attacker, &mut payload);

        let (Some(unit), Some(enemy)) = (
            self.world.unit(attacker).filter(|u| u.is_alive()),
            self.world.unit(target).filter(|u| u.is_alive()),
        ) else {
            return;
        };
        let damage = if payload.damage.is_finite() {
            payload.damage.max(0.0)
        } else {
            0.0
        };
        let from = unit.position;
        let to = enemy.position;
        let team = unit.team;
        let attack = unit.attack.clone();
        let attack_fx = unit.fx_refs.attack.clone();
        let sound = unit.sounds.attack.clone();
        let reach = unit.modified_stat(StatKind::AttackRange).max(0.0)
            + unit.radius()
            + enemy.radius();

        self.flash_fx(
            attack_fx.as_deref(),
            FxTarget::Unit {
                id: attacker,
                position: from,
            },
        );
        self.play_sound(SoundCue::Attack, sound.as_ref(), from);

        match attack.style {
            AttackStyle::Melee => {
                let expires_at = now + self.world.config.strike_visual_ms;
                self.world.strikes.push(MeleeStrike {
                    attacker,
                    target,
                    from,
                    to,
                    expires_at,
                });
                self.apply_damage(target, damage, DamageSource::with_team(attacker, team), false);
            }
            AttackStyle::Ranged => {
                let direction = (to - from).normalized();
                let velocity: Vec2 = direction * attack.projectile_speed;
                let id = self.world.allocate_object_id();
                self.world.projectiles.push(Projectile {
                    id,
                    source: attacker,
                    source_team: team,
                    position: from,
                    velocity,
                    traveled: 0.0,
                    max_distance: reach + attack.projectile_size,
                    damage,
                    area_radius: 0.0,
                    size: attack.projectile_size,
                    affect_allies: false,
                    affect_enemies: true,
                    impact_fx: None,
                    sprite: attack.projectile_sprite.clone(),
                    effects: Vec::new(),
                    skill: None,
                });
            }
        }
        tracing::trace!(
            target: "battle_core::combat",
            attacker = %attacker,
            target = %target,
            damage,
            style = %attack.style,
            "attack"
        );
    }

    /// Drops melee strike visuals whose lifetime ran out.
    pub(crate) fn age_strikes(&mut self) {
        let now = self.world.now();
        self.world.strikes.retain(|strike| strike.expires_at > now);
    }
}
