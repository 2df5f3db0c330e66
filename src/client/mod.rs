//! Client facade owning the stores
//!
//! A [`FitHubClient`] is constructed explicitly at application start; there
//! is no process-wide store state. Tests build their own client against a
//! [`ScriptedGateway`](crate::gateway::ScriptedGateway).

pub mod builder;

pub use builder::ClientBuilder;

use crate::config::ClientConfig;
use crate::core::events::{EventBus, EventEnvelope};
use crate::gateway::ApiClient;
use crate::store::{MemberStore, PaymentStore, StaffStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Entry point: the payment, member and staff stores sharing one gateway
/// and one event bus
#[derive(Clone)]
pub struct FitHubClient {
    payments: Arc<PaymentStore>,
    members: Arc<MemberStore>,
    staff: Arc<StaffStore>,
    api: ApiClient,
    events: EventBus,
    config: ClientConfig,
}

impl FitHubClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn payments(&self) -> &Arc<PaymentStore> {
        &self.payments
    }

    pub fn members(&self) -> &Arc<MemberStore> {
        &self.members
    }

    pub fn staff(&self) -> &Arc<StaffStore> {
        &self.staff
    }

    /// Typed endpoints, for calls that should not touch store state
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Events from every store
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    pub fn event_stream(&self) -> BroadcastStream<EventEnvelope> {
        self.events.stream()
    }

    /// Load payments, stats, members and staff concurrently
    ///
    /// Every store records its own failure; the first error is returned.
    pub async fn refresh_all(&self) -> crate::core::FitHubResult<()> {
        let (payments, stats, members, staff) = tokio::join!(
            self.payments.fetch_payments(),
            self.payments.fetch_payment_stats(),
            self.members.fetch_all(),
            self.staff.fetch_all(),
        );
        payments.and(stats).and(members).and(staff)
    }
}
