//! Match event bus.
//!
//! Collaborators subscribe to wave and outcome topics. Delivery is
//! synchronous and follows subscription order; the engine walks
//! [`EventBus::subscribers`] and invokes each handler in turn.

use log::debug;

use beachhead_core::events::MatchEvent;

/// Notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    WaveStarted,
    WaveEnded,
    Won,
    Lost,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Self::WaveStarted, Self::WaveEnded, Self::Won, Self::Lost];

    /// Topic an event is published on. Per-entity events are not broadcast.
    pub fn of(event: &MatchEvent) -> Option<Topic> {
        match event {
            MatchEvent::WaveStarted { .. } => Some(Topic::WaveStarted),
            MatchEvent::WaveEnded { .. } => Some(Topic::WaveEnded),
            MatchEvent::Won => Some(Topic::Won),
            MatchEvent::Lost => Some(Topic::Lost),
            _ => None,
        }
    }
}

/// Collaborators that can listen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// Match state: wave resolution and tower losses.
    Orchestrator,
    /// Wave roster release.
    Spawner,
    /// Preview session and per-wave quotas.
    Placement,
    /// Placed obstacles and their hazards.
    ObstacleRegistry,
    /// Outbound event stream in the snapshot.
    Presentation,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub topic: Topic,
    pub subscriber: Subscriber,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` on `topic`. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, topic: Topic, subscriber: Subscriber) -> Subscription {
        let subscription = Subscription { topic, subscriber };
        if !self.subscriptions.contains(&subscription) {
            self.subscriptions.push(subscription);
        }
        subscription
    }

    /// Remove one subscription. Returns whether it was present.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| *s != subscription);
        before != self.subscriptions.len()
    }

    /// Remove every subscription held by `subscriber`.
    pub fn unsubscribe_all(&mut self, subscriber: Subscriber) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.subscriber != subscriber);
        let removed = before - self.subscriptions.len();
        if removed > 0 {
            debug!("{subscriber:?} left the bus ({removed} subscriptions)");
        }
        removed
    }

    /// Subscribers of `topic` in delivery order.
    pub fn subscribers(&self, topic: Topic) -> Vec<Subscriber> {
        self.subscriptions
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| s.subscriber)
            .collect()
    }
}
