//! Authoritative battle state.
//!
//! [`World`] owns every live entity (units, projectiles, strike visuals,
//! terrain effects), the team/AI health ledger, the virtual clock, the
//! deferred-task scheduler and the per-unit event bus. There are no hidden
//! registries: a fresh `World` is a fresh match.
//!
//! Mutation that involves gameplay rules goes through
//! [`crate::engine::BattleEngine`]; the world itself exposes read access,
//! spatial queries and low-level bookkeeping.
mod clock;
mod geometry;
mod ids;
mod ledger;
mod outbox;
mod projectile;
mod scheduler;
mod snapshot;
mod terrain;
mod unit;

pub use clock::{GameClock, Millis};
pub use geometry::{Bounds, Vec2};
pub use ids::{AiId, ObjectId, Relation, TeamId, UnitId, same_team};
pub use ledger::{Aggregate, TeamAggregate, TeamLedger};
pub use outbox::BattleEvent;
pub use projectile::{MeleeStrike, Projectile};
pub use scheduler::{DeferredTask, Scheduler};
pub use snapshot::{UnitView, WorldSnapshot};
pub use terrain::{TerrainEffect, TerrainPayload};
pub use unit::{Unit, UnitBlueprint};

use std::collections::BTreeMap;

use crate::config::BattleConfig;
use crate::effect::{StatKind, TargetFlags};
use crate::env::IssueContext;
use crate::event::EventBus;

#[derive(Debug)]
pub struct World {
    pub(crate) config: BattleConfig,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) strikes: Vec<MeleeStrike>,
    pub(crate) terrain: Vec<TerrainEffect>,
    pub(crate) ledger: TeamLedger,
    pub(crate) clock: GameClock,
    pub(crate) scheduler: Scheduler,
    pub(crate) bus: EventBus,
    pub(crate) outbox: Vec<BattleEvent>,
    pub(crate) game_over: bool,
    pub(crate) winner: Option<TeamId>,
    /// Game time covered by the tick in progress.
    pub(crate) frame_delta: Millis,
    match_id: Option<String>,
    next_unit: u32,
    next_object: u32,
    roll_nonce: u64,
}

impl World {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            clock: GameClock::new(config.initial_speed),
            config,
            units: BTreeMap::new(),
            projectiles: Vec::new(),
            strikes: Vec::new(),
            terrain: Vec::new(),
            ledger: TeamLedger::new(),
            scheduler: Scheduler::default(),
            bus: EventBus::new(),
            outbox: Vec::new(),
            game_over: false,
            winner: None,
            frame_delta: 0.0,
            match_id: None,
            next_unit: 0,
            next_object: 0,
            roll_nonce: 0,
        }
    }

    #[must_use]
    pub fn with_match_id(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = Some(match_id.into());
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    // ===== time =====

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    /// Sets the speed multiplier (clamped to `[0.1, 3.0]`) and returns it.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        let applied = self.clock.set_speed(speed);
        tracing::debug!(target: "battle_core::world", speed = applied, "speed changed");
        applied
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    /// Ends the match regardless of standing teams.
    pub fn set_game_over(&mut self, winner: Option<TeamId>) {
        if !self.game_over {
            self.game_over = true;
            self.winner = winner;
            self.outbox.push(BattleEvent::GameOver { winner });
        }
    }

    // ===== entities =====

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Direct access for tooling and tests. Health changes made here bypass
    /// the ledger; gameplay code goes through the engine.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.units.get(&id).is_some_and(Unit::is_alive)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn strikes(&self) -> &[MeleeStrike] {
        &self.strikes
    }

    pub fn terrain_effects(&self) -> &[TerrainEffect] {
        &self.terrain
    }

    pub fn ledger(&self) -> &TeamLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TeamLedger {
        &mut self.ledger
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Takes the recorded transitions since the last drain.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        core::mem::take(&mut self.outbox)
    }

    /// Current value of `stat` for `unit`: base plus every active delta.
    pub fn modified_stat(&self, unit: UnitId, stat: StatKind) -> Option<f32> {
        self.units.get(&unit).map(|unit| unit.modified_stat(stat))
    }

    pub(crate) fn allocate_unit_id(&mut self) -> UnitId {
        self.next_unit += 1;
        UnitId(self.next_unit)
    }

    pub(crate) fn allocate_object_id(&mut self) -> ObjectId {
        self.next_object += 1;
        ObjectId(self.next_object)
    }

    pub(crate) fn next_roll_nonce(&mut self) -> u64 {
        self.roll_nonce += 1;
        self.roll_nonce
    }

    /// Diagnostics context for issues attributed to `unit`.
    pub fn issue_context(&self, unit: Option<UnitId>) -> IssueContext {
        let owner = unit.and_then(|id| self.units.get(&id));
        let team_id = owner.and_then(|unit| unit.team);
        let ai_id = owner.and_then(|unit| unit.ai);
        IssueContext {
            ai_id,
            team_id,
            ai_name: team_id
                .zip(ai_id)
                .and_then(|(team, ai)| self.ledger.ai_name(team, ai))
                .map(str::to_string),
            team_name: team_id
                .and_then(|team| self.ledger.team_name(team))
                .map(str::to_string),
            match_id: self.match_id.clone(),
        }
    }

    // ===== spatial queries =====

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.config.arena_width, self.config.arena_height)
    }

    pub fn is_in_bounds(&self, point: Vec2) -> bool {
        self.bounds().contains(point)
    }

    /// Live units whose centre lies within `radius` of `center`, by id.
    pub fn units_in_range(&self, center: Vec2, radius: f32) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|unit| unit.is_alive() && unit.position.distance(center) <= radius)
            .map(|unit| unit.id)
            .collect()
    }

    /// Live allies of `unit` within `radius`, excluding `unit` itself.
    pub fn allies_in_range(&self, unit: UnitId, radius: f32) -> Vec<UnitId> {
        self.related_in_range(unit, radius, Relation::Ally)
    }

    /// Live enemies of `unit` within `radius`.
    pub fn enemies_in_range(&self, unit: UnitId, radius: f32) -> Vec<UnitId> {
        self.related_in_range(unit, radius, Relation::Enemy)
    }

    fn related_in_range(&self, unit: UnitId, radius: f32, relation: Relation) -> Vec<UnitId> {
        let Some(origin) = self.units.get(&unit) else {
            return Vec::new();
        };
        self.units
            .values()
            .filter(|other| other.is_alive())
            .filter(|other| {
                Relation::between((origin.id, origin.team), (other.id, other.team)) == relation
            })
            .filter(|other| other.position.distance(origin.position) <= radius)
            .map(|other| other.id)
            .collect()
    }

    /// Resolves a target-type filter around `center` for a unit of `team`.
    ///
    /// The union of `allies`, `enemies` and `self` is returned de-duplicated
    /// in id order; an untyped filter returns every live unit in range.
    pub fn filtered_in_range(
        &self,
        center: Vec2,
        radius: f32,
        origin: Option<UnitId>,
        team: Option<TeamId>,
        filter: TargetFlags,
    ) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|unit| unit.is_alive() && unit.position.distance(center) <= radius)
            .filter(|unit| {
                if filter.is_untyped() {
                    return true;
                }
                if Some(unit.id) == origin {
                    return filter.contains(TargetFlags::SELF);
                }
                if same_team(team, unit.team) {
                    filter.contains(TargetFlags::ALLIES)
                } else {
                    filter.contains(TargetFlags::ENEMIES)
                }
            })
            .map(|unit| unit.id)
            .collect()
    }

    /// Nearest live unit standing in `relation` to `unit`.
    pub fn nearest(&self, unit: UnitId, relation: Relation) -> Option<UnitId> {
        let origin = self.units.get(&unit)?;
        self.units
            .values()
            .filter(|other| other.is_alive())
            .filter(|other| {
                Relation::between((origin.id, origin.team), (other.id, other.team)) == relation
            })
            .min_by(|a, b| {
                a.position
                    .distance(origin.position)
                    .total_cmp(&b.position.distance(origin.position))
            })
            .map(|other| other.id)
    }

    pub fn nearest_enemy(&self, unit: UnitId) -> Option<UnitId> {
        self.nearest(unit, Relation::Enemy)
    }

    pub fn nearest_ally(&self, unit: UnitId) -> Option<UnitId> {
        self.nearest(unit, Relation::Ally)
    }

    /// Sum of live unit health per team, for consistency checks.
    pub fn team_health(&self, team: TeamId) -> f32 {
        self.units
            .values()
            .filter(|unit| unit.team == Some(team))
            .map(|unit| unit.health)
            .sum()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}
