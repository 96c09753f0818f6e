//! Damage and heal resolution.
//!
//! Every health mutation goes through [`BattleEngine::change_health`], which
//! clamps to `[0, max]` and shifts the team and AI aggregates by the applied
//! delta in the same call.
use crate::env::FxTarget;
use crate::event::EventPayload;
use crate::state::{TeamId, UnitId, World, same_team};

use super::{BattleEngine, default_fx};

/// Who dealt damage. The team is captured separately so projectiles keep
/// their allegiance after the shooter dies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageSource {
    pub unit: Option<UnitId>,
    pub team: Option<TeamId>,
}

impl DamageSource {
    /// Environmental damage with no attacker.
    pub const NONE: Self = Self {
        unit: None,
        team: None,
    };

    pub fn unit(world: &World, unit: UnitId) -> Self {
        Self {
            unit: Some(unit),
            team: world.unit(unit).and_then(|u| u.team),
        }
    }

    pub fn with_team(unit: UnitId, team: Option<TeamId>) -> Self {
        Self {
            unit: Some(unit),
            team,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// Target absent, dead, protected by the friendly-fire guard, or the
    /// amount was not a number.
    Ignored,
    Dealt { amount: f32, killed: bool },
}

impl DamageOutcome {
    pub fn amount(self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Dealt { amount, .. } => amount,
        }
    }

    pub fn killed(self) -> bool {
        matches!(self, Self::Dealt { killed: true, .. })
    }
}

impl BattleEngine<'_> {
    /// Resolves an attack-style hit on `target`.
    ///
    /// Emits `DamageReceived` with a mutable payload before applying, then
    /// subtracts every active shield with a floor of 1.
    pub fn apply_damage(
        &mut self,
        target: UnitId,
        amount: f32,
        source: DamageSource,
        can_damage_allies: bool,
    ) -> DamageOutcome {
        if !amount.is_finite() {
            return DamageOutcome::Ignored;
        }
        let Some(unit) = self.world.unit(target).filter(|u| u.is_alive()) else {
            return DamageOutcome::Ignored;
        };
        if !can_damage_allies && same_team(source.team, unit.team) {
            tracing::trace!(
                target: "battle_core::combat",
                unit = %target,
                attacker = ?source.unit,
                "friendly fire blocked"
            );
            return DamageOutcome::Ignored;
        }

        let mut payload = EventPayload::damage_received(target, source.unit, amount);
        self.emit(target, &mut payload);

        let Some(unit) = self.world.unit(target).filter(|u| u.is_alive()) else {
            return DamageOutcome::Ignored;
        };
        let mut damage = if payload.damage.is_finite() {
            payload.damage
        } else {
            0.0
        };
        if damage > 0.0
            && let Some(shield) = unit.shield()
        {
            damage = (damage - shield).max(1.0);
        }
        if damage <= 0.0 {
            return DamageOutcome::Dealt {
                amount: 0.0,
                killed: false,
            };
        }

        let dealt = -self.change_health(target, -damage);
        tracing::trace!(
            target: "battle_core::combat",
            unit = %target,
            attacker = ?source.unit,
            damage = dealt,
            "damage applied"
        );

        if self.world.unit(target).is_some_and(|u| u.health <= 0.0) {
            self.kill_unit(target, source.unit);
            return DamageOutcome::Dealt {
                amount: dealt,
                killed: true,
            };
        }

        let fx = self
            .world
            .unit(target)
            .map(|u| (u.fx_refs.damage.clone(), FxTarget::Unit { id: u.id, position: u.position }));
        if let Some((fx_id, anchor)) = fx {
            self.flash_fx(Some(fx_id.as_deref().unwrap_or(default_fx::DAMAGE)), anchor);
        }
        DamageOutcome::Dealt {
            amount: dealt,
            killed: false,
        }
    }

    /// Heals `target`, clamped to max health. Returns the amount restored.
    pub fn apply_heal(&mut self, target: UnitId, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 || !self.world.is_alive(target) {
            return 0.0;
        }
        let healed = self.change_health(target, amount);
        if healed > 0.0
            && let Some(anchor) = self.unit_fx_target(target)
        {
            self.flash_fx(Some(default_fx::HEAL), anchor);
        }
        healed
    }

    /// Damage that bypasses events, shields and the friendly-fire guard
    /// (pulses, aura and terrain ticks). Kills on lethal.
    pub fn apply_direct_damage(
        &mut self,
        target: UnitId,
        amount: f32,
        killer: Option<UnitId>,
    ) -> f32 {
        if !amount.is_finite() || amount <= 0.0 || !self.world.is_alive(target) {
            return 0.0;
        }
        let dealt = -self.change_health(target, -amount);
        if self.world.unit(target).is_some_and(|u| u.health <= 0.0) {
            self.kill_unit(target, killer);
        }
        dealt
    }

    /// Applies a signed health change and mirrors it into the ledger.
    /// Returns the delta actually applied after clamping.
    pub(crate) fn change_health(&mut self, target: UnitId, delta: f32) -> f32 {
        let Some(unit) = self.world.units.get_mut(&target) else {
            return 0.0;
        };
        let before = unit.health;
        let after = (before + delta).clamp(0.0, unit.max_health);
        unit.health = after;
        let applied = after - before;
        let (team, ai) = (unit.team, unit.ai);
        self.world.ledger.shift(team, ai, applied);
        applied
    }
}
