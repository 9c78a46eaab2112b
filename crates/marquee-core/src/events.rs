//! Mutation events and the event bus that distributes them.
//!
//! Every successful create/update/delete is announced as a [`FavoriteEvent`].
//! The server streams them to connected clients; the client uses them to
//! invalidate its cached page sequences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned wrapper around a [`FavoriteEvent`].
///
/// ## Wire Format (SSE)
///
/// ```text
/// event: favorite.created
/// id: 019508a0-1234-7def-8000-abcdef123456
/// data: {"event_id":"...","event_type":"favorite.created","occurred_at":"...","payload":{...}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type (e.g., `"favorite.deleted"`).
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Payload schema version.
    pub payload_version: u32,
    pub payload: FavoriteEvent,
}

impl EventEnvelope {
    pub fn new(event: FavoriteEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: Utc::now(),
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Favorite Event
// ============================================================================

/// A mutation of the record store.
///
/// Serialized with a `type` tag, e.g. `{"type":"Deleted","id":4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FavoriteEvent {
    Created { id: i64 },
    Updated { id: i64 },
    Deleted { id: i64 },
}

impl FavoriteEvent {
    /// Namespaced event type used as the SSE event name.
    pub fn event_type(&self) -> &'static str {
        match self {
            FavoriteEvent::Created { .. } => "favorite.created",
            FavoriteEvent::Updated { .. } => "favorite.updated",
            FavoriteEvent::Deleted { .. } => "favorite.deleted",
        }
    }

    /// Id of the affected entry.
    pub fn favorite_id(&self) -> i64 {
        match self {
            FavoriteEvent::Created { id }
            | FavoriteEvent::Updated { id }
            | FavoriteEvent::Deleted { id } => *id,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus.
///
/// Uses `tokio::sync::broadcast` with a fixed buffer. Slow receivers that fall
/// behind get a `Lagged` error and miss events; consumers that only need to
/// know "something changed" treat a lag as one more change.
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently if nobody listens.
    pub fn emit(&self, event: FavoriteEvent) {
        let envelope = EventEnvelope::new(event);
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            favorite_id = event.favorite_id(),
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
