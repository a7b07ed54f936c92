//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out hub for [`ReviewEvent`]s. It is constructed
//! once at process start and shared via `Arc<EventBus>`; tests instantiate
//! their own isolated buses. Delivery is best-effort and at-most-once per
//! currently-subscribed receiver -- subscribers that connect after a
//! publish never see it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ReviewEvent
// ---------------------------------------------------------------------------

/// An event broadcast to live subscribers.
///
/// `event` is the SSE event name (`file-change`, `comment-added`,
/// `comment-deleted`, `hook-trigger`); `payload` is the event-specific
/// JSON body delivered verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub event: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    /// Create an event with an empty object payload.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published [`ReviewEvent`]. A subscriber
/// whose connection dies simply drops its receiver; nothing is retried.
pub struct EventBus {
    sender: broadcast::Sender<ReviewEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped.
    pub fn publish(&self, event: ReviewEvent) {
        // Ignore the SendError -- it only means there are no receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            ReviewEvent::new("comment-added")
                .with_payload(serde_json::json!({"documentId": "plan-a"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event, "comment-added");
        assert_eq!(received.payload["documentId"], "plan-a");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ReviewEvent::new("hook-trigger"));

        assert_eq!(rx1.recv().await.unwrap().event, "hook-trigger");
        assert_eq!(rx2.recv().await.unwrap().event, "hook-trigger");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(ReviewEvent::new("orphan-event"));
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(ReviewEvent::new("before"));

        let mut rx = bus.subscribe();
        bus.publish(ReviewEvent::new("after"));

        assert_eq!(rx.recv().await.unwrap().event, "after");
        assert!(rx.try_recv().is_err());
    }
}
