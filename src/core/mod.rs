//! Core module containing fundamental traits and types for the client

pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod reminders;
pub mod stats;

pub use entity::{Entity, EntityId, EntityLabels};
pub use error::{FitHubError, FitHubResult, GatewayError, ValidationError};
pub use events::{EntityEvent, EventBus, EventEnvelope, PaymentEvent, StoreEvent};
pub use query::{FilterUpdate, Page, PaymentFilters, Selection, apply_filters};
pub use reminders::{
    PlannedMembershipReminder, PlannedReminder, expiring_members, overdue_candidates,
    plan_membership_reminders, plan_reminders,
};
pub use stats::{PaymentStats, Trend, TrendDirection};
