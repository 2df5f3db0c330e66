//! # FitHub Client
//!
//! Client-side state engine for the FitHub gym administration dashboard.
//!
//! ## Features
//!
//! - **Payment Filter/Stats Engine**: base collection, filters and a
//!   filtered view kept consistent in one step, plus server-computed stats
//! - **Member and Staff Stores**: list, detail, create, status and delete
//! - **Typed Gateway**: `reqwest` transport with strict response schemas;
//!   malformed payloads are a distinct error kind
//! - **Latest Request Wins**: overlapping fetches never apply stale data
//! - **Reminders and Overdue Sweep**: due-date driven, explicitly triggered
//! - **Store Events**: every change is broadcast on a shared event bus
//! - **YAML Configuration**: with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fithub::prelude::*;
//!
//! let client = FitHubClient::builder()
//!     .with_config(ClientConfig::from_yaml_file("fithub.yaml")?)
//!     .build()?;
//!
//! let payments = client.payments();
//! payments.fetch_payments().await?;
//! payments.set_filter(FilterUpdate::member_name("john"));
//! payments.set_filter(FilterUpdate::status(PaymentStatus::Pending));
//!
//! for payment in payments.filtered_payments() {
//!     println!("{} owes {}", payment.member.name, payment.amount);
//! }
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod entities;
pub mod gateway;
pub mod store;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Client ===
    pub use crate::client::{ClientBuilder, FitHubClient};
    pub use crate::config::ClientConfig;

    // === Core ===
    pub use crate::core::{
        Entity, EntityEvent, EntityId, EventBus, EventEnvelope, FilterUpdate, FitHubError,
        FitHubResult, GatewayError, Page, PaymentEvent, PaymentFilters, PaymentStats,
        PlannedMembershipReminder, PlannedReminder, Selection, StoreEvent, Trend, TrendDirection,
        ValidationError, apply_filters,
    };

    // === Records ===
    pub use crate::entities::{
        ExportFormat, ExportRequest, ExportedFile, ImportFile, Member, MemberSnapshot, NewMember,
        NewPayment, NewStaff, Payment, PaymentStatus, ReminderChannel, ReminderConfig, Staff,
    };

    // === Gateway ===
    pub use crate::gateway::{
        ApiClient, Gateway, GatewayRequest, GatewayResponse, HttpGateway, Method,
        ScriptedGateway,
    };

    // === Stores ===
    pub use crate::store::{
        DispatchReport, EntityStore, MemberStore, PaymentStore, PaymentsState, StaffStore,
    };

    pub use crate::telemetry::init_tracing;

    // === External re-exports ===
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use rust_decimal::Decimal;
}
