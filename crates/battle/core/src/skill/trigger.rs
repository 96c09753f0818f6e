//! Time and health gated activation.
//!
//! Precedence for the tick-driven path:
//! 1. A health threshold fires once when current/max health drops to or below
//!    the configured fraction, then arms the interval.
//! 2. After the threshold fired, a configured interval fires repeatedly, each
//!    time gated by `chance`.
//! 3. An interval with no discrete trigger at all is purely periodic from the
//!    moment the skill was applied.
//!
//! An interval configured next to on-attack, on-spawn or similar discrete
//! triggers without a threshold never fires.
use super::config::TriggerConfig;
use crate::state::Millis;

/// Why a skill fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerKind {
    Spawn,
    Attack,
    AttackOnce,
    GetAttacked,
    Death,
    Interval,
    HealthThreshold,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerGate {
    threshold_fired: bool,
    attack_once_fired: bool,
    last_interval: Option<Millis>,
}

impl TriggerGate {
    /// Gate whose interval clock starts at `now`.
    pub fn armed_at(now: Millis) -> Self {
        Self {
            threshold_fired: false,
            attack_once_fired: false,
            last_interval: Some(now),
        }
    }

    pub fn threshold_fired(&self) -> bool {
        self.threshold_fired
    }

    /// Returns `true` exactly once.
    pub fn take_attack_once(&mut self) -> bool {
        !core::mem::replace(&mut self.attack_once_fired, true)
    }

    /// Evaluates the tick-driven triggers. `roll` decides a chance check.
    pub fn poll(
        &mut self,
        config: &TriggerConfig,
        health_ratio: f32,
        now: Millis,
        roll: impl FnOnce(f32) -> bool,
    ) -> Option<TriggerKind> {
        if let Some(threshold) = config.health_threshold {
            if !self.threshold_fired {
                if health_ratio <= threshold {
                    self.threshold_fired = true;
                    self.last_interval = Some(now);
                    return Some(TriggerKind::HealthThreshold);
                }
                return None;
            }
            return self.poll_interval(config, now, roll);
        }

        if config.is_pure_interval() {
            return self.poll_interval(config, now, roll);
        }
        None
    }

    fn poll_interval(
        &mut self,
        config: &TriggerConfig,
        now: Millis,
        roll: impl FnOnce(f32) -> bool,
    ) -> Option<TriggerKind> {
        let interval = config.interval.filter(|i| i.is_finite() && *i > 0.0)?;
        let last = *self.last_interval.get_or_insert(now);
        let elapsed = now - last;
        if elapsed < interval {
            return None;
        }
        // Keep the cadence aligned to the interval grid.
        self.last_interval = Some(now - elapsed % interval);
        let chance = config.chance.unwrap_or(1.0);
        roll(chance).then_some(TriggerKind::Interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: f32) -> bool {
        true
    }

    #[test]
    fn pure_interval_fires_on_cadence() {
        let config = TriggerConfig::every(1000.0);
        let mut gate = TriggerGate::armed_at(0.0);
        assert_eq!(gate.poll(&config, 1.0, 999.0, always), None);
        assert_eq!(gate.poll(&config, 1.0, 1000.0, always), Some(TriggerKind::Interval));
        assert_eq!(gate.poll(&config, 1.0, 1500.0, always), None);
        assert_eq!(gate.poll(&config, 1.0, 2040.0, always), Some(TriggerKind::Interval));
        // Aligned to the 1000 ms grid, not to the late poll at 2040.
        assert_eq!(gate.poll(&config, 1.0, 3000.0, always), Some(TriggerKind::Interval));
    }

    #[test]
    fn interval_next_to_discrete_trigger_is_ignored() {
        let config = TriggerConfig {
            on_attack: true,
            interval: Some(100.0),
            ..TriggerConfig::default()
        };
        let mut gate = TriggerGate::armed_at(0.0);
        assert_eq!(gate.poll(&config, 1.0, 10_000.0, always), None);
    }

    #[test]
    fn threshold_fires_once_then_arms_interval() {
        let config = TriggerConfig {
            health_threshold: Some(0.5),
            interval: Some(1000.0),
            ..TriggerConfig::default()
        };
        let mut gate = TriggerGate::armed_at(0.0);
        assert_eq!(gate.poll(&config, 0.8, 5000.0, always), None);
        assert_eq!(
            gate.poll(&config, 0.5, 6000.0, always),
            Some(TriggerKind::HealthThreshold)
        );
        assert_eq!(gate.poll(&config, 0.4, 6500.0, always), None);
        assert_eq!(gate.poll(&config, 0.4, 7000.0, always), Some(TriggerKind::Interval));
    }

    #[test]
    fn threshold_without_interval_fires_once() {
        let config = TriggerConfig {
            health_threshold: Some(0.3),
            ..TriggerConfig::default()
        };
        let mut gate = TriggerGate::armed_at(0.0);
        assert_eq!(
            gate.poll(&config, 0.1, 10.0, always),
            Some(TriggerKind::HealthThreshold)
        );
        assert_eq!(gate.poll(&config, 0.1, 20_000.0, always), None);
    }

    #[test]
    fn failed_chance_still_consumes_the_interval() {
        let config = TriggerConfig {
            interval: Some(100.0),
            chance: Some(0.25),
            ..TriggerConfig::default()
        };
        let mut gate = TriggerGate::armed_at(0.0);
        assert_eq!(gate.poll(&config, 1.0, 100.0, |_| false), None);
        assert_eq!(gate.poll(&config, 1.0, 150.0, always), None);
    }

    #[test]
    fn attack_once_latches() {
        let mut gate = TriggerGate::default();
        assert!(gate.take_attack_once());
        assert!(!gate.take_attack_once());
    }
}
