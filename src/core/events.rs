//! Store change notifications
//!
//! Every store publishes on a shared [`EventBus`] after it has applied a
//! change, so presentation code can re-render from a fresh snapshot instead
//! of polling. It uses `tokio::sync::broadcast` to decouple stores from any
//! number of listeners.
//!
//! # Architecture
//!
//! ```text
//! PaymentStore ──┐
//! MemberStore  ──┼──▶ EventBus::publish() ──▶ broadcast channel ──▶ UI listeners
//! StaffStore   ──┘                                              ──▶ loggers, tests
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(1024);
//! let mut rx = bus.subscribe();
//!
//! store.fetch_payments().await?;
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} changed: {}", envelope.event.store(), envelope.event.action());
//! }
//! ```

use crate::core::entity::EntityId;
use crate::entities::{PaymentStatus, ReminderChannel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Changes applied by the payment store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// The base collection was replaced by a fetch
    Loaded { total: usize, visible: usize },
    /// A payment was created and appended
    Created { payment_id: EntityId },
    /// A payment's status was changed
    StatusChanged {
        payment_id: EntityId,
        status: PaymentStatus,
    },
    /// The filter set changed and the filtered view was re-derived
    FiltersChanged { visible: usize },
    /// A fresh stats snapshot was stored
    StatsRefreshed,
    /// A reminder request was accepted by the backend
    ReminderSent {
        payment_id: EntityId,
        channel: ReminderChannel,
    },
    /// An import file was accepted by the backend
    Imported { file_name: String },
    /// An export file was produced
    Exported { file_name: String, bytes: usize },
}

/// Changes applied by a member or staff store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EntityEvent {
    Loaded {
        entity_type: String,
        total: usize,
    },
    Selected {
        entity_type: String,
        entity_id: EntityId,
    },
    Created {
        entity_type: String,
        entity_id: EntityId,
    },
    StatusChanged {
        entity_type: String,
        entity_id: EntityId,
        status: String,
    },
    Deleted {
        entity_type: String,
        entity_id: EntityId,
    },
}

/// Top-level store event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreEvent {
    Payment(PaymentEvent),
    Entity(EntityEvent),
    /// An operation failed; the store's error message was set to `message`
    Failed {
        store: String,
        operation: String,
        message: String,
    },
}

impl StoreEvent {
    /// Name of the store that emitted the event
    pub fn store(&self) -> &str {
        match self {
            StoreEvent::Payment(_) => "payments",
            StoreEvent::Entity(e) => match e {
                EntityEvent::Loaded { entity_type, .. }
                | EntityEvent::Selected { entity_type, .. }
                | EntityEvent::Created { entity_type, .. }
                | EntityEvent::StatusChanged { entity_type, .. }
                | EntityEvent::Deleted { entity_type, .. } => entity_type,
            },
            StoreEvent::Failed { store, .. } => store,
        }
    }

    /// Get the action name
    pub fn action(&self) -> &str {
        match self {
            StoreEvent::Payment(p) => match p {
                PaymentEvent::Loaded { .. } => "loaded",
                PaymentEvent::Created { .. } => "created",
                PaymentEvent::StatusChanged { .. } => "status_changed",
                PaymentEvent::FiltersChanged { .. } => "filters_changed",
                PaymentEvent::StatsRefreshed => "stats_refreshed",
                PaymentEvent::ReminderSent { .. } => "reminder_sent",
                PaymentEvent::Imported { .. } => "imported",
                PaymentEvent::Exported { .. } => "exported",
            },
            StoreEvent::Entity(e) => match e {
                EntityEvent::Loaded { .. } => "loaded",
                EntityEvent::Selected { .. } => "selected",
                EntityEvent::Created { .. } => "created",
                EntityEvent::StatusChanged { .. } => "status_changed",
                EntityEvent::Deleted { .. } => "deleted",
            },
            StoreEvent::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StoreEvent::Failed { .. })
    }
}

/// Envelope wrapping a store event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the change was applied
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

/// Broadcast-based event bus shared by all stores
///
/// The bus is cheap to clone (Arc internally) and can be shared across threads.
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
    /// Never fails: with no subscribers the event is dropped. Returns the
    /// number of receivers that will see it.
    pub fn publish(&self, event: StoreEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Subscribe as a `Stream`; lagged gaps surface as stream errors
    pub fn stream(&self) -> BroadcastStream<EventEnvelope> {
        BroadcastStream::new(self.sender.subscribe())
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
