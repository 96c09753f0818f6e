//! Per-unit event bus.
//!
//! Listeners are keyed by the exact `(unit id, event kind)` pair. Emission
//! (see [`crate::engine::BattleEngine::emit`]) invokes them synchronously in
//! registration order with a mutable payload, so a listener can rewrite the
//! `damage` field before the emitter reads it back. One failing listener never
//! prevents the others from running.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::skill::TriggerKind;
use crate::state::UnitId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Emitted on the attacker when it lands a base attack.
    Attack,
    /// Emitted on the target before damage is applied.
    DamageReceived,
    /// Emitted on the dying unit before it is removed.
    Death,
}

/// Mutable payload shared by every listener of one emission.
#[derive(Clone, Debug, PartialEq)]
pub struct EventPayload {
    pub kind: EventKind,
    /// Unit that was attacked, damaged or killed.
    pub target: UnitId,
    /// Unit responsible, when known.
    pub attacker: Option<UnitId>,
    pub damage: f32,
}

impl EventPayload {
    pub fn attack(attacker: UnitId, target: UnitId, damage: f32) -> Self {
        Self {
            kind: EventKind::Attack,
            target,
            attacker: Some(attacker),
            damage,
        }
    }

    pub fn damage_received(target: UnitId, attacker: Option<UnitId>, damage: f32) -> Self {
        Self {
            kind: EventKind::DamageReceived,
            target,
            attacker,
            damage,
        }
    }

    pub fn death(target: UnitId, killer: Option<UnitId>) -> Self {
        Self {
            kind: EventKind::Death,
            target,
            attacker: killer,
            damage: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

pub type EventHook = Arc<dyn Fn(&mut EventPayload) -> Result<(), ListenerError> + Send + Sync>;

#[derive(Clone)]
pub enum Listener {
    /// Arbitrary pre-processing hook.
    Hook(EventHook),
    /// Routes the event into a skill of `owner`.
    Skill {
        owner: UnitId,
        skill: String,
        trigger: TriggerKind,
    },
}

impl Listener {
    pub fn hook(
        hook: impl Fn(&mut EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
    ) -> Self {
        Self::Hook(Arc::new(hook))
    }

    fn owner(&self) -> Option<UnitId> {
        match self {
            Self::Hook(_) => None,
            Self::Skill { owner, .. } => Some(*owner),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(_) => f.write_str("Listener::Hook"),
            Self::Skill {
                owner,
                skill,
                trigger,
            } => f
                .debug_struct("Listener::Skill")
                .field("owner", owner)
                .field("skill", skill)
                .field("trigger", trigger)
                .finish(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Clone, Debug)]
struct Subscription {
    id: ListenerId,
    listener: Listener,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: BTreeMap<(UnitId, EventKind), Vec<Subscription>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, target: UnitId, kind: EventKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.subscriptions
            .entry((target, kind))
            .or_default()
            .push(Subscription { id, listener });
        id
    }

    /// Removes one listener. Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.subscriptions.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|sub| sub.id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });
        removed
    }

    /// Drops every listener keyed to `unit` and every skill listener it owns.
    pub fn clear(&mut self, unit: UnitId) {
        self.subscriptions.retain(|(target, _), subs| {
            if *target == unit {
                return false;
            }
            subs.retain(|sub| sub.listener.owner() != Some(unit));
            !subs.is_empty()
        });
    }

    /// Drops the listeners a single skill registered.
    pub fn clear_skill(&mut self, owner: UnitId, skill: &str) {
        self.subscriptions.retain(|_, subs| {
            subs.retain(|sub| {
                !matches!(&sub.listener, Listener::Skill { owner: o, skill: s, .. } if *o == owner && s == skill)
            });
            !subs.is_empty()
        });
    }

    /// Snapshot of the listeners for one pair, in registration order.
    pub fn listeners(&self, target: UnitId, kind: EventKind) -> Vec<(ListenerId, Listener)> {
        self.subscriptions
            .get(&(target, kind))
            .map(|subs| {
                subs.iter()
                    .map(|sub| (sub.id, sub.listener.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.subscriptions
            .values()
            .any(|subs| subs.iter().any(|sub| sub.id == id))
    }

    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Listener::hook(|_| Ok(()))
    }

    #[test]
    fn listeners_keep_registration_order() {
        let mut bus = EventBus::new();
        let first = bus.on(UnitId(1), EventKind::Attack, noop());
        let second = bus.on(UnitId(1), EventKind::Attack, noop());
        bus.on(UnitId(2), EventKind::Attack, noop());

        let ids: Vec<_> = bus
            .listeners(UnitId(1), EventKind::Attack)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![first, second]);
        assert!(bus.listeners(UnitId(1), EventKind::Death).is_empty());
    }

    #[test]
    fn clear_drops_keyed_and_owned_listeners() {
        let mut bus = EventBus::new();
        bus.on(UnitId(1), EventKind::Death, noop());
        let owned = bus.on(
            UnitId(2),
            EventKind::DamageReceived,
            Listener::Skill {
                owner: UnitId(1),
                skill: "thorns".into(),
                trigger: TriggerKind::GetAttacked,
            },
        );
        let unrelated = bus.on(UnitId(2), EventKind::DamageReceived, noop());

        bus.clear(UnitId(1));
        assert!(!bus.is_registered(owned));
        assert!(bus.is_registered(unrelated));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn off_is_idempotent() {
        let mut bus = EventBus::new();
        let id = bus.on(UnitId(3), EventKind::Attack, noop());
        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert!(bus.is_empty());
    }
}
