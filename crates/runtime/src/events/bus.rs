//! Topic-based event bus implementation.
use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{BattleEvent, ValidationIssue};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::broadcast;

use super::types::{FrameEvent, MatchEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::EnumIter)]
pub enum Topic {
    /// Units entering and leaving the arena
    Units,
    /// Effect and skill lifecycle
    Skills,
    /// Match lifecycle: start, speed, pause, game over
    Match,
    /// One event per simulated frame
    Frame,
    /// Validation and runtime issues
    Diagnostics,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Battle(BattleEvent),
    Match(MatchEvent),
    Frame(FrameEvent),
    Issue(ValidationIssue),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Battle(event) => match event {
                BattleEvent::UnitSpawned { .. }
                | BattleEvent::UnitDied { .. }
                | BattleEvent::UnitRemoved { .. } => Topic::Units,
                BattleEvent::EffectApplied { .. }
                | BattleEvent::EffectExpired { .. }
                | BattleEvent::SkillActivated { .. }
                | BattleEvent::SkillDeactivated { .. } => Topic::Skills,
                BattleEvent::GameOver { .. } => Topic::Match,
            },
            Event::Match(_) => Topic::Match,
            Event::Frame(_) => Topic::Frame,
            Event::Issue(_) => Topic::Diagnostics,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is best-effort: events for a topic
/// nobody listens to are dropped.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = Topic::iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(RwLock::new(channels)),
            capacity,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        let channels = self.channels.read();
        if let Some(tx) = channels.get(&topic)
            && tx.send(event).is_err()
        {
            tracing::trace!(target: "battle_runtime::events", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        if let Some(tx) = self.channels.read().get(&topic) {
            return tx.subscribe();
        }
        self.channels
            .write()
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels
            .read()
            .get(&topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{TeamId, UnitId};

    use super::*;

    #[test]
    fn events_route_by_topic() {
        let bus = EventBus::with_capacity(8);
        let mut units = bus.subscribe(Topic::Units);
        let mut matches = bus.subscribe(Topic::Match);

        bus.publish(Event::Battle(BattleEvent::UnitRemoved { unit: UnitId(3) }));
        bus.publish(Event::Battle(BattleEvent::GameOver {
            winner: Some(TeamId(1)),
        }));

        assert!(matches!(
            units.try_recv(),
            Ok(Event::Battle(BattleEvent::UnitRemoved { unit })) if unit == UnitId(3)
        ));
        assert!(units.try_recv().is_err());
        assert!(matches!(
            matches.try_recv(),
            Ok(Event::Battle(BattleEvent::GameOver { .. }))
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(Event::Match(MatchEvent::Paused));
        assert_eq!(bus.subscriber_count(Topic::Match), 0);

        let clone = bus.clone();
        let _rx = clone.subscribe(Topic::Match);
        assert_eq!(bus.subscriber_count(Topic::Match), 1);
    }

    #[test]
    fn subscribe_multiple_returns_one_receiver_per_topic() {
        let bus = EventBus::new();
        let receivers = bus.subscribe_multiple(&[Topic::Units, Topic::Diagnostics]);
        assert_eq!(receivers.len(), 2);
        assert!(receivers.contains_key(&Topic::Diagnostics));
    }
}
