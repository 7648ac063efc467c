//! Broadcast event bus implementation

use super::events::ChatEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events buffered per subscriber
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`ChatEvent`]s to every subscribed view.
///
/// Publishing never fails: with no subscribers the event is dropped, and a
/// subscriber that falls too far behind observes a lag on its next receive.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: ChatEvent) {
        trace!("Publishing {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(ChatEvent::TypingStarted);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(ChatEvent::SessionCleared);

        assert_eq!(first.recv().await.unwrap(), ChatEvent::SessionCleared);
        assert_eq!(second.recv().await.unwrap(), ChatEvent::SessionCleared);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.publish(ChatEvent::ResetStarted);

        let mut rx = bus.subscribe();
        bus.publish(ChatEvent::ResetFinished);

        assert_eq!(rx.recv().await.unwrap(), ChatEvent::ResetFinished);
        assert!(rx.try_recv().is_err());
    }
}
