//! Change-event bus for live-query notifications
//!
//! The EventBus decouples mutations (REST handlers, the data client) from
//! notifications (live-query snapshot streams). It uses
//! `tokio::sync::broadcast` so that any number of subscriptions can observe
//! the same mutation.
//!
//! ```text
//! store.create() ──┐
//! store.update() ──┼──▶ EventBus::publish() ──▶ broadcast ──▶ SnapshotStream (per owner)
//! store.delete() ──┘                                      ──▶ WebSocket connections
//! ```
//!
//! Subscribers do not read record data out of events; an event only tells a
//! live query that its owner's collection may have changed, and the query
//! re-lists the store to build the next authoritative snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A record mutation observed by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A record was created
    Created {
        record_type: String,
        record_id: Uuid,
        owner_id: Uuid,
    },
    /// A record was updated
    Updated {
        record_type: String,
        record_id: Uuid,
        owner_id: Uuid,
    },
    /// A record was deleted
    Deleted {
        record_type: String,
        record_id: Uuid,
        owner_id: Uuid,
    },
}

impl ChangeEvent {
    /// Get the record type this event relates to
    pub fn record_type(&self) -> &str {
        match self {
            ChangeEvent::Created { record_type, .. }
            | ChangeEvent::Updated { record_type, .. }
            | ChangeEvent::Deleted { record_type, .. } => record_type,
        }
    }

    /// Get the record ID this event relates to
    pub fn record_id(&self) -> Uuid {
        match self {
            ChangeEvent::Created { record_id, .. }
            | ChangeEvent::Updated { record_id, .. }
            | ChangeEvent::Deleted { record_id, .. } => *record_id,
        }
    }

    /// Get the owner of the affected record
    pub fn owner_id(&self) -> Uuid {
        match self {
            ChangeEvent::Created { owner_id, .. }
            | ChangeEvent::Updated { owner_id, .. }
            | ChangeEvent::Deleted { owner_id, .. } => *owner_id,
        }
    }

    /// Get the action name (created, updated, deleted)
    pub fn action(&self) -> &'static str {
        match self {
            ChangeEvent::Created { .. } => "created",
            ChangeEvent::Updated { .. } => "updated",
            ChangeEvent::Deleted { .. } => "deleted",
        }
    }
}

/// Envelope wrapping a change event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the mutation was observed
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: ChangeEvent,
}

impl EventEnvelope {
    /// Create a new event envelope
    pub fn new(event: ChangeEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based change-event bus
///
/// Cheap to clone (the sender is Arc internally) and shared between the
/// store and every live query.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity bounds how many events a slow subscriber can fall behind
    /// before it starts seeing `Lagged`. Lag is harmless for live queries
    /// because they rebuild full snapshots from the store.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Non-blocking and infallible. With no subscribers the event is simply
    /// dropped. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() errors only when there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events
    ///
    /// Events published before this call are not received.
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
