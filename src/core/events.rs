//! Friendship lifecycle events
//!
//! The [`EventBus`] decouples friendship mutations from whoever wants to
//! react to them (notifications, feeds, cache invalidation). It wraps a
//! `tokio::sync::broadcast` channel.
//!
//! ```text
//! request_friendship ────┐
//! confirm_friendship_with├──▶ EventBus::publish() ──▶ broadcast ──▶ subscribers
//! end_friendship_with ───┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(1024);
//! let registry = FriendlyRegistry::new(repository).with_event_bus(bus.clone());
//! let mut rx = bus.subscribe();
//!
//! users.request_friendship(&joe, &quentin).await?;
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} {}", envelope.event.join_type(), envelope.event.action());
//! }
//! ```

use crate::core::friendship::Friendship;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A mutation of a friendship join row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FriendshipEvent {
    /// A new join row was created
    Requested {
        join_type: String,
        friendship: Friendship,
    },
    /// A pending row was accepted
    Confirmed {
        join_type: String,
        friendship: Friendship,
    },
    /// The row(s) between two entities were deleted
    Ended {
        join_type: String,
        actor_id: Uuid,
        other_id: Uuid,
        removed: u64,
    },
}

impl FriendshipEvent {
    /// The join type this event relates to
    pub fn join_type(&self) -> &str {
        match self {
            FriendshipEvent::Requested { join_type, .. }
            | FriendshipEvent::Confirmed { join_type, .. }
            | FriendshipEvent::Ended { join_type, .. } => join_type,
        }
    }

    /// Get the action name (requested, confirmed, ended)
    pub fn action(&self) -> &str {
        match self {
            FriendshipEvent::Requested { .. } => "requested",
            FriendshipEvent::Confirmed { .. } => "confirmed",
            FriendshipEvent::Ended { .. } => "ended",
        }
    }

    /// Whether the event concerns `entity_id`
    pub fn involves(&self, entity_id: Uuid) -> bool {
        match self {
            FriendshipEvent::Requested { friendship, .. }
            | FriendshipEvent::Confirmed { friendship, .. } => friendship.involves(entity_id),
            FriendshipEvent::Ended {
                actor_id, other_id, ..
            } => *actor_id == entity_id || *other_id == entity_id,
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    pub event: FriendshipEvent,
}

impl EventEnvelope {
    pub fn new(event: FriendshipEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged). A capacity of zero is
    /// raised to one, the smallest buffer a broadcast channel accepts.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: FriendshipEvent) -> usize {
        // send() only errors when nobody is listening
        self.sender.send(EventEnvelope::new(event)).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
