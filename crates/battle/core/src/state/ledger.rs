//! Team and AI health aggregates.
//!
//! The ledger is an eagerly maintained cache: every code path that changes a
//! unit's health also adjusts its team entry and, when present, its AI entry
//! in the same call. Current health is always clamped to `[0, total]`.
use std::collections::BTreeMap;

use super::ids::{AiId, TeamId};

/// Summed health of a group of units.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    pub name: Option<String>,
    pub total_health: f32,
    pub current_health: f32,
    pub units: u32,
}

impl Aggregate {
    fn enroll(&mut self, max_health: f32, health: f32) {
        self.total_health += max_health;
        self.current_health = (self.current_health + health).clamp(0.0, self.total_health);
        self.units += 1;
    }

    fn withdraw(&mut self, max_health: f32, health: f32) {
        self.total_health = (self.total_health - max_health).max(0.0);
        self.current_health = (self.current_health - health).clamp(0.0, self.total_health);
        self.units = self.units.saturating_sub(1);
    }

    fn shift(&mut self, delta: f32) {
        self.current_health = (self.current_health + delta).clamp(0.0, self.total_health);
    }
}

/// Team entry with its per-AI breakdown.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamAggregate {
    pub team: Aggregate,
    pub ais: BTreeMap<AiId, Aggregate>,
    /// Set once the team has fielded at least one unit.
    pub fielded: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamLedger {
    teams: BTreeMap<TeamId, TeamAggregate>,
}

impl TeamLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_team(&mut self, team: TeamId, name: impl Into<String>) {
        self.teams.entry(team).or_default().team.name = Some(name.into());
    }

    pub fn register_ai(&mut self, team: TeamId, ai: AiId, name: impl Into<String>) {
        self.teams
            .entry(team)
            .or_default()
            .ais
            .entry(ai)
            .or_default()
            .name = Some(name.into());
    }

    pub fn team(&self, team: TeamId) -> Option<&TeamAggregate> {
        self.teams.get(&team)
    }

    pub fn ai(&self, team: TeamId, ai: AiId) -> Option<&Aggregate> {
        self.teams.get(&team).and_then(|entry| entry.ais.get(&ai))
    }

    pub fn teams(&self) -> impl Iterator<Item = (&TeamId, &TeamAggregate)> {
        self.teams.iter()
    }

    pub fn team_name(&self, team: TeamId) -> Option<&str> {
        self.teams.get(&team).and_then(|entry| entry.team.name.as_deref())
    }

    pub fn ai_name(&self, team: TeamId, ai: AiId) -> Option<&str> {
        self.ai(team, ai).and_then(|entry| entry.name.as_deref())
    }

    /// Records a spawned unit.
    pub fn enroll(&mut self, team: Option<TeamId>, ai: Option<AiId>, max_health: f32, health: f32) {
        let Some(team) = team else { return };
        let entry = self.teams.entry(team).or_default();
        entry.fielded = true;
        entry.team.enroll(max_health, health);
        if let Some(ai) = ai {
            entry.ais.entry(ai).or_default().enroll(max_health, health);
        }
    }

    /// Records a removed unit with its remaining health.
    pub fn withdraw(&mut self, team: Option<TeamId>, ai: Option<AiId>, max_health: f32, health: f32) {
        let Some(entry) = team.and_then(|team| self.teams.get_mut(&team)) else {
            return;
        };
        entry.team.withdraw(max_health, health);
        if let Some(aggregate) = ai.and_then(|ai| entry.ais.get_mut(&ai)) {
            aggregate.withdraw(max_health, health);
        }
    }

    /// Propagates a signed health change of a member unit.
    pub fn shift(&mut self, team: Option<TeamId>, ai: Option<AiId>, delta: f32) {
        if delta == 0.0 {
            return;
        }
        let Some(entry) = team.and_then(|team| self.teams.get_mut(&team)) else {
            return;
        };
        entry.team.shift(delta);
        if let Some(aggregate) = ai.and_then(|ai| entry.ais.get_mut(&ai)) {
            aggregate.shift(delta);
        }
    }

    /// Teams that fielded units and still have live members.
    pub fn standing_teams(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|(_, entry)| entry.fielded && entry.team.units > 0)
            .map(|(team, _)| *team)
            .collect()
    }

    pub fn fielded_teams(&self) -> usize {
        self.teams.values().filter(|entry| entry.fielded).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_never_exceeds_total() {
        let mut ledger = TeamLedger::new();
        let team = Some(TeamId(1));
        ledger.enroll(team, Some(AiId(7)), 100.0, 100.0);
        ledger.shift(team, Some(AiId(7)), 50.0);
        let entry = ledger.team(TeamId(1)).unwrap();
        assert_eq!(entry.team.current_health, 100.0);
        assert_eq!(ledger.ai(TeamId(1), AiId(7)).unwrap().current_health, 100.0);

        ledger.shift(team, Some(AiId(7)), -250.0);
        assert_eq!(ledger.team(TeamId(1)).unwrap().team.current_health, 0.0);
    }

    #[test]
    fn withdraw_removes_remaining_health_and_count() {
        let mut ledger = TeamLedger::new();
        let team = Some(TeamId(1));
        ledger.enroll(team, None, 100.0, 100.0);
        ledger.enroll(team, None, 50.0, 50.0);
        ledger.shift(team, None, -30.0);
        ledger.withdraw(team, None, 100.0, 70.0);

        let entry = &ledger.team(TeamId(1)).unwrap().team;
        assert_eq!(entry.units, 1);
        assert_eq!(entry.total_health, 50.0);
        assert_eq!(entry.current_health, 50.0);
    }

    #[test]
    fn teamless_units_are_not_tracked() {
        let mut ledger = TeamLedger::new();
        ledger.enroll(None, None, 10.0, 10.0);
        assert_eq!(ledger.fielded_teams(), 0);
    }
}
