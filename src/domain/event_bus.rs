//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Services publish
//! a [`TicketingEvent`] after each committed change and every WebSocket
//! connection subscribes to receive filtered events.

use tokio::sync::broadcast;

use super::TicketingEvent;

/// Broadcast bus for [`TicketingEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers. Publishing never blocks a purchase.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TicketingEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event; zero when
    /// nobody is listening.
    pub fn publish(&self, event: TicketingEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TicketingEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventId;
    use chrono::Utc;

    fn sold_out(event_id: EventId) -> TicketingEvent {
        TicketingEvent::EventSoldOut {
            event_id,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(sold_out(EventId::new())), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_the_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = EventId::new();
        assert_eq!(bus.publish(sold_out(id)), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.event_id(), id);
        assert_eq!(e2.event_id(), id);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
