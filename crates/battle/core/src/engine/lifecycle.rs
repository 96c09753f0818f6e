//! Spawning, death and removal.
use crate::effect::ActiveEffect;
use crate::env::{FxTarget, IssueSeverity, SoundCue, SpawnRequest};
use crate::error::{BattleError, ErrorSeverity};
use crate::event::EventPayload;
use crate::skill::{self, SkillSlot};
use crate::state::{BattleEvent, UnitBlueprint, UnitId};

use super::{BattleEngine, default_fx};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("unit type '{0}' not found")]
    UnknownUnitType(String),

    #[error("the match is over")]
    GameOver,
}

impl BattleError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownUnitType(_) => ErrorSeverity::Validation,
            Self::GameOver => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUnitType(_) => "SPAWN_UNKNOWN_TYPE",
            Self::GameOver => "SPAWN_GAME_OVER",
        }
    }
}

impl BattleEngine<'_> {
    /// Creates a unit from its configured type and activates its skills.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<UnitId, SpawnError> {
        if self.world.game_over {
            return Err(SpawnError::GameOver);
        }
        let config = self
            .env
            .content()
            .unit_type(&request.unit_type)
            .ok_or_else(|| SpawnError::UnknownUnitType(request.unit_type.clone()))?;

        let mut blueprint = UnitBlueprint::from_type(&config, request.position);
        blueprint.team = request.team;
        blueprint.ai = request.ai;
        Ok(self.spawn_blueprint(blueprint))
    }

    /// Creates a unit from resolved fields, plays its spawn feedback and
    /// applies each listed skill in order.
    pub fn spawn_blueprint(&mut self, blueprint: UnitBlueprint) -> UnitId {
        let skills = blueprint.skills.clone();
        let id = self.add_unit(blueprint);

        if let Some(unit) = self.world.unit(id) {
            let anchor = FxTarget::Unit {
                id,
                position: unit.position,
            };
            let spawn_fx = unit.fx_refs.spawn.clone();
            let continuous_fx = unit.fx_refs.continuous.clone();
            let sound = unit.sounds.spawn.clone();
            let position = unit.position;

            self.flash_fx(Some(spawn_fx.as_deref().unwrap_or(default_fx::SPAWN)), anchor);
            let handle = self.start_fx(continuous_fx.as_deref(), anchor);
            if let Some(unit) = self.world.units.get_mut(&id) {
                unit.continuous_fx = handle;
            }
            self.play_sound(SoundCue::Spawn, sound.as_ref(), position);
        }

        for name in skills {
            if !self.world.is_alive(id) {
                break;
            }
            // Failures are reported inside; the unit fights on without the skill.
            let _ = self.apply_skill(id, &name);
        }
        id
    }

    /// Registers a unit: clamps it into the arena and enrolls it in the ledger.
    pub fn add_unit(&mut self, mut blueprint: UnitBlueprint) -> UnitId {
        let id = self.world.allocate_unit_id();
        let now = self.world.now();
        blueprint.position = self
            .world
            .bounds()
            .clamp(blueprint.position, blueprint.appearance.radius());
        let unit = blueprint.into_unit(id, now);

        self.world
            .ledger
            .enroll(unit.team, unit.ai, unit.max_health, unit.health);
        self.world.outbox.push(BattleEvent::UnitSpawned {
            unit: id,
            unit_type: unit.type_id.clone(),
            team: unit.team,
            summoned_by: unit.summoned_by,
        });
        tracing::debug!(
            target: "battle_core::lifecycle",
            unit = %id,
            unit_type = %unit.type_id,
            team = ?unit.team,
            health = unit.health,
            "unit spawned"
        );
        self.world.units.insert(id, unit);
        id
    }

    /// Attaches a skill slot to a live unit. No-op if the unit is gone.
    pub fn register_skill(&mut self, unit: UnitId, slot: SkillSlot) -> bool {
        match self.world.units.get_mut(&unit) {
            Some(owner) => {
                owner.skills.push(slot);
                true
            }
            None => false,
        }
    }

    /// Death path: emits `Death`, plays death feedback, then removes the unit.
    pub fn kill_unit(&mut self, id: UnitId, killer: Option<UnitId>) {
        let Some(unit) = self.world.units.get_mut(&id) else {
            return;
        };
        if unit.dying {
            return;
        }
        unit.dying = true;
        let team = unit.team;

        let mut payload = EventPayload::death(id, killer);
        self.emit(id, &mut payload);

        if let Some(unit) = self.world.unit(id) {
            let anchor = FxTarget::Unit {
                id,
                position: unit.position,
            };
            let death_fx = unit.fx_refs.death.clone();
            let sound = unit.sounds.death.clone();
            let position = unit.position;
            self.flash_fx(Some(death_fx.as_deref().unwrap_or(default_fx::DEATH)), anchor);
            self.play_sound(SoundCue::Death, sound.as_ref(), position);
        }

        self.world
            .outbox
            .push(BattleEvent::UnitDied { unit: id, killer, team });
        tracing::debug!(
            target: "battle_core::lifecycle",
            unit = %id,
            killer = ?killer,
            "unit died"
        );
        self.remove_unit(id);
    }

    /// Removes a unit, running every skill cleanup, effect cleanup and
    /// continuous visual exactly once. Returns `false` if already absent.
    pub fn remove_unit(&mut self, id: UnitId) -> bool {
        let Some(mut unit) = self.world.units.remove(&id) else {
            return false;
        };
        self.world.bus.clear(id);
        self.world.scheduler.cancel_for(id);

        let mut slots = core::mem::take(&mut unit.skills);
        for slot in &mut slots {
            skill::cleanup_slot(self, &unit, slot);
        }

        let effects: Vec<ActiveEffect> = core::mem::take(&mut unit.effects);
        for mut effect in effects {
            for err in effect.dispose_all() {
                self.report(
                    &effect.definition.id,
                    format!("cleanup failed while removing {id}: {err}"),
                    IssueSeverity::Error,
                    None,
                );
            }
        }
        if let Err(err) = unit.continuous_fx.dispose() {
            self.report_error(&unit.type_id, &err, None);
        }

        self.world
            .ledger
            .withdraw(unit.team, unit.ai, unit.max_health, unit.health);
        self.world.outbox.push(BattleEvent::UnitRemoved { unit: id });
        tracing::debug!(
            target: "battle_core::lifecycle",
            unit = %id,
            "unit removed"
        );
        true
    }
}
