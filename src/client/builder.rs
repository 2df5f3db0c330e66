//! ClientBuilder for wiring a gateway, the event bus and the stores

use super::FitHubClient;
use crate::config::ClientConfig;
use crate::core::events::EventBus;
use crate::core::{FitHubError, FitHubResult};
use crate::gateway::{ApiClient, Gateway, HttpGateway};
use crate::store::{MemberStore, PaymentStore, StaffStore};
use std::sync::Arc;

/// Builder for [`FitHubClient`]
///
/// Without an explicit gateway an [`HttpGateway`] is created from the
/// configuration.
///
/// # Example
///
/// ```ignore
/// let client = ClientBuilder::new()
///     .with_config(ClientConfig::from_yaml_file("fithub.yaml")?.with_env_overrides()?)
///     .build()?;
///
/// client.payments().fetch_payments().await?;
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<ClientConfig>,
    gateway: Option<Arc<dyn Gateway>>,
    event_bus: Option<EventBus>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom transport (e.g. [`ScriptedGateway`](crate::gateway::ScriptedGateway))
    pub fn with_gateway(mut self, gateway: impl Gateway + 'static) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    /// Use a transport that is also held elsewhere
    pub fn with_shared_gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Share an existing event bus instead of creating one from the config
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn build(self) -> FitHubResult<FitHubClient> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| FitHubError::Config(e.to_string()))?;

        let gateway: Arc<dyn Gateway> = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(HttpGateway::new(config.clone())?),
        };
        let events = self
            .event_bus
            .unwrap_or_else(|| EventBus::new(config.event_capacity));
        let api = ApiClient::new(gateway);

        tracing::debug!(
            base_url = %config.base_url,
            api_prefix = %config.api_prefix,
            "FitHub client ready"
        );

        Ok(FitHubClient {
            payments: Arc::new(PaymentStore::new(api.clone(), events.clone())),
            members: Arc::new(MemberStore::new(api.clone(), events.clone())),
            staff: Arc::new(StaffStore::new(api.clone(), events.clone())),
            api,
            events,
            config,
        })
    }
}
