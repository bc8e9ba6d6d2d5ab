//! Change events published by a document store
//!
//! The EventBus decouples writes from realtime listeners. It uses
//! `tokio::sync::broadcast`: every write publishes one event, and every
//! open collection subscription holds one receiver.
//!
//! # Architecture
//!
//! ```text
//! add/update/delete ──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscription (clients)
//!                                                                ──▶ subscription (payments)
//!                                                                ──▶ ...
//! ```
//!
//! A subscription reacts to events for its own path by re-reading the full
//! snapshot, so a lagged receiver loses nothing.

use crate::core::collection::CollectionPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A document mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A document was added
    Created {
        path: CollectionPath,
        document_id: String,
    },
    /// A document was merged with a patch
    Updated {
        path: CollectionPath,
        document_id: String,
    },
    /// A document was removed
    Deleted {
        path: CollectionPath,
        document_id: String,
    },
}

impl StoreEvent {
    /// Path of the collection that changed
    pub fn path(&self) -> &CollectionPath {
        match self {
            StoreEvent::Created { path, .. }
            | StoreEvent::Updated { path, .. }
            | StoreEvent::Deleted { path, .. } => path,
        }
    }

    /// Id of the document that changed
    pub fn document_id(&self) -> &str {
        match self {
            StoreEvent::Created { document_id, .. }
            | StoreEvent::Updated { document_id, .. }
            | StoreEvent::Deleted { document_id, .. } => document_id,
        }
    }

    /// Get the action name (created, updated, deleted)
    pub fn action(&self) -> &str {
        match self {
            StoreEvent::Created { .. } => "created",
            StoreEvent::Updated { .. } => "updated",
            StoreEvent::Deleted { .. } => "deleted",
        }
    }
}

/// Envelope wrapping a store event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: StoreEvent,
}

impl EventEnvelope {
    pub fn new(event: StoreEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (Arc internally) and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: StoreEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::Collection;

    fn path() -> CollectionPath {
        CollectionPath::new("app", "user-1", Collection::Clients)
    }

    #[test]
    fn test_event_serialization_tags_action() {
        let event = StoreEvent::Created {
            path: path(),
            document_id: "doc-1".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "created");
        assert_eq!(json["path"]["collection"], "clients");
    }

    #[test]
    fn test_event_accessors() {
        let event = StoreEvent::Deleted {
            path: path(),
            document_id: "doc-2".to_string(),
        };

        assert_eq!(event.path(), &path());
        assert_eq!(event.document_id(), "doc-2");
        assert_eq!(event.action(), "deleted");
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let receivers = bus.publish(StoreEvent::Updated {
            path: path(),
            document_id: "doc-3".to_string(),
        });
        assert_eq!(receivers, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.document_id(), "doc-3");
        assert_eq!(received.event.action(), "updated");
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::new(16);
        let receivers = bus.publish(StoreEvent::Created {
            path: path(),
            document_id: "doc-4".to_string(),
        });
        assert_eq!(receivers, 0);
    }

    #[test]
    fn test_receiver_count_drops_with_receiver() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let bus2 = bus.clone();
        assert_eq!(bus2.receiver_count(), 1);

        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
