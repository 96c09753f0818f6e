//! Per-frame driver.
use crate::skill;
use crate::state::{DeferredTask, Millis, UnitId};

use super::BattleEngine;

/// What one call to [`BattleEngine::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Game time the frame covered; zero when paused or over.
    pub game_delta: Millis,
    pub game_over: bool,
}

impl BattleEngine<'_> {
    /// Advances the match by `real_delta_ms` of wall time.
    ///
    /// Order within a frame:
    /// 1. deferred tasks that fell due
    /// 2. base updates (targeting, movement, attacks) for every unit
    /// 3. skill updates, collected up front, in unit then registration order
    /// 4. the active-effect processor for every unit
    /// 5. free-standing projectiles
    /// 6. terrain effects
    pub fn tick(&mut self, real_delta_ms: Millis) -> TickReport {
        if self.world.game_over || self.world.clock.is_paused() {
            return TickReport {
                game_delta: 0.0,
                game_over: self.world.game_over,
            };
        }
        let game_delta = self.world.clock.advance(real_delta_ms);
        self.world.frame_delta = game_delta;
        if game_delta <= 0.0 {
            return TickReport::default();
        }

        self.run_deferred();

        let units: Vec<UnitId> = self.world.unit_ids();
        for &unit in &units {
            self.update_unit_base(unit);
        }
        self.age_strikes();

        let slots: Vec<(UnitId, String)> = self
            .world
            .units()
            .flat_map(|unit| unit.skills.iter().map(move |slot| (unit.id, slot.name.clone())))
            .collect();
        for (unit, name) in slots {
            skill::update_slot(self, unit, &name);
        }

        for unit in self.world.unit_ids() {
            self.process_effects(unit);
        }

        self.advance_world_projectiles();
        self.advance_terrain();
        self.refresh_game_over();

        TickReport {
            game_delta,
            game_over: self.world.game_over,
        }
    }

    fn run_deferred(&mut self) {
        let now = self.world.now();
        for task in self.world.scheduler.take_due(now) {
            match task {
                DeferredTask::Suicide { unit, skill } => {
                    if self.world.is_alive(unit) {
                        tracing::debug!(
                            target: "battle_core::skill",
                            unit = %unit,
                            skill = %skill,
                            "suicide"
                        );
                        self.kill_unit(unit, None);
                    }
                }
                DeferredTask::ExpireSummon { unit } => {
                    if self.world.contains(unit) {
                        tracing::debug!(
                            target: "battle_core::skill",
                            unit = %unit,
                            "summon expired"
                        );
                        self.remove_unit(unit);
                    }
                }
            }
        }
    }

    /// Ends the match once two or more teams have fielded units and at most
    /// one of them still stands.
    pub fn refresh_game_over(&mut self) -> bool {
        if self.world.game_over {
            return true;
        }
        let ledger = &self.world.ledger;
        if ledger.fielded_teams() < 2 {
            return false;
        }
        let standing = ledger.standing_teams();
        if standing.len() > 1 {
            return false;
        }
        let winner = standing.first().copied();
        tracing::info!(
            target: "battle_core::world",
            winner = ?winner,
            game_time = self.world.now(),
            "match over"
        );
        self.world.set_game_over(winner);
        true
    }
}
