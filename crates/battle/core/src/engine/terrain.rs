//! Free-standing area effects left behind by "no-unit" effects.
use std::sync::Arc;

use crate::effect::{EffectDefinition, EffectSource};
use crate::env::FxTarget;
use crate::state::{ObjectId, TeamId, TerrainEffect, TerrainPayload, UnitId, Vec2};

use super::BattleEngine;

impl BattleEngine<'_> {
    /// Anchors `effect` to the ground at `position`.
    ///
    /// Forwarding ids are resolved now; a direct effect pulses its amounts,
    /// anything else is applied to each qualifying unit standing inside.
    pub fn spawn_terrain(
        &mut self,
        effect: &Arc<EffectDefinition>,
        position: Vec2,
        source: Option<UnitId>,
        team: Option<TeamId>,
    ) -> Option<ObjectId> {
        let resolved = match self.resolve_forwarding(Arc::clone(effect)) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.report_error(&effect.id, &err, source);
                return None;
            }
        };
        let payload = match resolved.direct_amounts() {
            Some((heal, damage)) => TerrainPayload::Direct { heal, damage },
            None => TerrainPayload::Apply(Arc::clone(&resolved)),
        };

        let config = &self.world.config;
        let radius = effect
            .aura_radius
            .or(resolved.aura_radius)
            .unwrap_or(config.terrain_radius);
        let duration_ms = effect
            .duration_ms
            .or(resolved.duration_ms)
            .unwrap_or(config.terrain_duration_ms);
        let pulse_interval_ms = effect
            .pulse_interval_ms
            .or(resolved.pulse_interval_ms)
            .unwrap_or(config.default_pulse_interval_ms);

        let anchor = FxTarget::Point(position);
        self.flash_fx(effect.target_fx.start.as_deref(), anchor);
        let visual = self.start_fx(effect.target_fx.continuous.as_deref(), anchor);

        let id = self.world.allocate_object_id();
        let now = self.world.now();
        self.world.terrain.push(TerrainEffect {
            id,
            effect_id: effect.id.clone(),
            position,
            radius,
            targets: effect.targets,
            team,
            source,
            duration_ms,
            pulse_interval_ms,
            payload,
            created_at: now,
            // First pulse lands on the next advance.
            last_pulse: now - pulse_interval_ms,
            visual,
        });
        tracing::debug!(
            target: "battle_core::terrain",
            effect = %effect.id,
            x = position.x,
            y = position.y,
            radius,
            "terrain effect placed"
        );
        Some(id)
    }

    /// Expires and pulses every terrain effect.
    pub(crate) fn advance_terrain(&mut self) {
        let now = self.world.now();
        let mut remaining = Vec::new();

        for mut terrain in core::mem::take(&mut self.world.terrain) {
            if now - terrain.created_at >= terrain.duration_ms {
                self.dispose(&terrain.effect_id, &mut terrain.visual, terrain.source);
                if let Some(effect) = self.env.content().effect(&terrain.effect_id) {
                    self.flash_fx(effect.target_fx.end.as_deref(), FxTarget::Point(terrain.position));
                }
                tracing::debug!(
                    target: "battle_core::terrain",
                    effect = %terrain.effect_id,
                    "terrain effect expired"
                );
                continue;
            }

            let interval = terrain.pulse_interval_ms;
            let elapsed = now - terrain.last_pulse;
            if interval > 0.0 && elapsed >= interval {
                terrain.last_pulse = now - elapsed % interval;
                self.pulse_terrain(&terrain);
            }
            remaining.push(terrain);
        }

        remaining.append(&mut self.world.terrain);
        self.world.terrain = remaining;
    }

    fn pulse_terrain(&mut self, terrain: &TerrainEffect) {
        let targets = self.world.filtered_in_range(
            terrain.position,
            terrain.radius,
            terrain.source,
            terrain.team,
            terrain.targets,
        );
        for unit in targets {
            match &terrain.payload {
                TerrainPayload::Apply(definition) => {
                    let source = EffectSource {
                        unit: terrain.source,
                        skill: None,
                    };
                    self.apply_effect(unit, Arc::clone(definition), source);
                }
                TerrainPayload::Direct { heal, damage } => {
                    self.apply_heal(unit, *heal);
                    self.apply_direct_damage(unit, *damage, terrain.source);
                }
            }
        }
    }
}
