//! Active-effect application and per-tick processing.
use std::sync::Arc;

use crate::effect::{ActiveEffect, ApplyOutcome, EffectDefinition, EffectError, EffectSource, StatKind};
use crate::env::FxTarget;
use crate::state::{BattleEvent, Millis, UnitId};

use super::BattleEngine;

/// Forwarding chains longer than this are treated as loops.
const MAX_FORWARD_DEPTH: usize = 8;

impl BattleEngine<'_> {
    /// Fresh base-plus-deltas value of `stat` for `unit`.
    pub fn get_modified_stat(&self, unit: UnitId, stat: StatKind) -> Option<f32> {
        self.world.modified_stat(unit, stat)
    }

    /// Follows forwarding ids to the effect that actually lands.
    pub(crate) fn resolve_forwarding(
        &self,
        definition: Arc<EffectDefinition>,
    ) -> Result<Arc<EffectDefinition>, EffectError> {
        let mut current = definition;
        for _ in 0..MAX_FORWARD_DEPTH {
            let Some(target) = current.forwards_to().map(str::to_string) else {
                return Ok(current);
            };
            let next = self.env.content().effect(&target).ok_or_else(|| {
                EffectError::ForwardTargetMissing {
                    effect: current.id.clone(),
                    target: target.clone(),
                }
            })?;
            current = next;
        }
        Err(EffectError::ForwardLoop {
            effect: current.id.clone(),
        })
    }

    /// Attaches an effect to `target`.
    ///
    /// Re-applying an id that is already active is a no-op: no refresh and no
    /// second stat delta. Direct effects without a pulse land once and are
    /// not stored.
    pub fn apply_effect(
        &mut self,
        target: UnitId,
        definition: Arc<EffectDefinition>,
        source: EffectSource,
    ) -> ApplyOutcome {
        let definition = match self.resolve_forwarding(definition) {
            Ok(definition) => definition,
            Err(err) => {
                self.report_error(&err_source(&err), &err, source.unit);
                return ApplyOutcome::Unresolved;
            }
        };
        let Some(unit) = self.world.unit(target).filter(|u| u.is_alive()) else {
            return ApplyOutcome::TargetMissing;
        };
        let anchor = FxTarget::Unit {
            id: target,
            position: unit.position,
        };

        if definition.is_instant() {
            let (heal, damage) = definition.direct_amounts().unwrap_or_default();
            self.flash_fx(definition.target_fx.start.as_deref(), anchor);
            self.apply_heal(target, heal);
            self.apply_direct_damage(target, damage, source.unit);
            return ApplyOutcome::Landed;
        }
        if unit.has_effect(&definition.id) {
            return ApplyOutcome::AlreadyActive;
        }

        let now = self.world.now();
        let mut active = ActiveEffect::new(Arc::clone(&definition), source.clone());
        active.started_at = Some(now);
        active.last_pulse = Some(now);

        self.flash_fx(definition.target_fx.start.as_deref(), anchor);
        active.target_fx = self.start_fx(definition.target_fx.continuous.as_deref(), anchor);
        if let Some(source_anchor) = source.unit.and_then(|unit| self.unit_fx_target(unit)) {
            self.flash_fx(definition.source_fx.start.as_deref(), source_anchor);
            active.source_fx =
                self.start_fx(definition.source_fx.continuous.as_deref(), source_anchor);
        }

        let Some(unit) = self.world.units.get_mut(&target) else {
            for err in active.dispose_all() {
                self.report_error(&definition.id, &err, Some(target));
            }
            return ApplyOutcome::TargetMissing;
        };
        unit.effects.push(active);
        self.world.outbox.push(BattleEvent::EffectApplied {
            unit: target,
            effect: definition.id.clone(),
        });
        tracing::debug!(
            target: "battle_core::effects",
            unit = %target,
            effect = %definition.id,
            source = ?source.unit,
            "effect applied"
        );
        ApplyOutcome::Applied
    }

    /// Removes an effect early, running its cleanups and end visual.
    pub fn remove_effect(&mut self, target: UnitId, effect_id: &str) -> bool {
        let Some(mut effect) = self
            .world
            .units
            .get_mut(&target)
            .and_then(|unit| unit.take_effect(effect_id))
        else {
            return false;
        };
        self.finish_effect(target, &mut effect);
        true
    }

    /// Advances every effect on `unit`: expiry first, then pulses.
    ///
    /// A failure while processing one effect drops only that effect.
    pub fn process_effects(&mut self, unit: UnitId) {
        let Some(ids) = self
            .world
            .unit(unit)
            .map(|u| u.effects.iter().map(|e| e.id().to_string()).collect::<Vec<_>>())
        else {
            return;
        };
        let now = self.world.now();

        for id in ids {
            if !self.world.contains(unit) {
                break;
            }
            if let Err(err) = self.process_effect(unit, &id, now) {
                let unit_type = self
                    .world
                    .unit(unit)
                    .map(|u| u.type_id.clone())
                    .unwrap_or_default();
                self.report(
                    &id,
                    format!("effect '{id}' on {unit_type} ({unit}) dropped: {err}"),
                    crate::env::IssueSeverity::Error,
                    Some(unit),
                );
                if let Some(mut effect) = self
                    .world
                    .units
                    .get_mut(&unit)
                    .and_then(|u| u.take_effect(&id))
                {
                    for err in effect.dispose_all() {
                        self.report_error(&id, &err, Some(unit));
                    }
                }
            }
        }
    }

    fn process_effect(&mut self, unit: UnitId, id: &str, now: Millis) -> Result<(), EffectError> {
        let Some(effect) = self
            .world
            .units
            .get_mut(&unit)
            .and_then(|u| u.effects.iter_mut().find(|e| e.id() == id))
        else {
            return Ok(());
        };
        let started = *effect.started_at.get_or_insert(now);
        let last_pulse = *effect.last_pulse.get_or_insert(now);
        let definition = Arc::clone(&effect.definition);
        let source = effect.source.unit;

        if let Some(duration) = definition.duration_ms
            && now - started >= duration
        {
            if let Some(mut effect) = self
                .world
                .units
                .get_mut(&unit)
                .and_then(|u| u.take_effect(id))
            {
                self.finish_effect(unit, &mut effect);
            }
            return Ok(());
        }

        let Some(interval) = definition.pulse_interval_ms else {
            return Ok(());
        };
        let Some((heal, damage)) = definition.direct_amounts() else {
            return Ok(());
        };
        let elapsed = now - last_pulse;
        if elapsed < interval {
            return Ok(());
        }
        if !heal.is_finite() || !damage.is_finite() {
            return Err(EffectError::NonFinite {
                effect: definition.id.clone(),
                field: if heal.is_finite() { "damage" } else { "heal" },
            });
        }
        if let Some(effect) = self
            .world
            .units
            .get_mut(&unit)
            .and_then(|u| u.effects.iter_mut().find(|e| e.id() == id))
        {
            effect.last_pulse = Some(now - elapsed % interval);
        }
        tracing::trace!(
            target: "battle_core::effects",
            unit = %unit,
            effect = %definition.id,
            heal,
            damage,
            "pulse"
        );
        self.apply_heal(unit, heal);
        self.apply_direct_damage(unit, damage, source);
        Ok(())
    }

    /// Runs an effect's cleanups (each independently) and its end visuals.
    fn finish_effect(&mut self, unit: UnitId, effect: &mut ActiveEffect) {
        for err in effect.dispose_all() {
            self.report_error(&effect.definition.id, &err, Some(unit));
        }
        if let Some(anchor) = self.unit_fx_target(unit) {
            self.flash_fx(effect.definition.target_fx.end.as_deref(), anchor);
        }
        if let Some(source_anchor) = effect.source.unit.and_then(|s| self.unit_fx_target(s)) {
            self.flash_fx(effect.definition.source_fx.end.as_deref(), source_anchor);
        }
        self.world.outbox.push(BattleEvent::EffectExpired {
            unit,
            effect: effect.definition.id.clone(),
        });
        tracing::debug!(
            target: "battle_core::effects",
            unit = %unit,
            effect = %effect.definition.id,
            "effect ended"
        );
    }
}

fn err_source(err: &EffectError) -> String {
    match err {
        EffectError::ForwardTargetMissing { effect, .. }
        | EffectError::ForwardLoop { effect }
        | EffectError::NonFinite { effect, .. } => effect.clone(),
        EffectError::Fx(_) => "fx".to_string(),
    }
}
