//! Typed endpoints of the FitHub backend

use super::{Gateway, GatewayRequest};
use crate::core::GatewayError;
use crate::core::entity::{Entity, EntityId};
use crate::core::query::Page;
use crate::core::stats::PaymentStats;
use crate::entities::{
    ExportRequest, ImportFile, NewPayment, Payment, PaymentStatus, ReminderChannel,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

/// Typed client over any [`Gateway`]
///
/// Non-success statuses become [`GatewayError::Rejected`] and bodies that do
/// not decode into the expected schema become
/// [`GatewayError::MalformedPayload`].
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<dyn Gateway>,
}

impl ApiClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: GatewayRequest) -> Result<Vec<u8>, GatewayError> {
        let route = request.route();
        let response = self.gateway.send(request).await?;
        if !response.is_success() {
            let err = GatewayError::rejected(response.status, &response.body);
            tracing::debug!(route = %route, status = response.status, "Request rejected");
            return Err(err);
        }
        Ok(response.body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: GatewayRequest,
        resource: &str,
    ) -> Result<T, GatewayError> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(resource, error = %e, "Response does not match schema");
            GatewayError::malformed(resource, e)
        })
    }

    // === Payments ===

    pub async fn list_payments(&self) -> Result<Page<Payment>, GatewayError> {
        self.fetch(GatewayRequest::get("/payments"), "payment list").await
    }

    pub async fn payment_stats(&self) -> Result<PaymentStats, GatewayError> {
        self.fetch(GatewayRequest::get("/payments/stats"), "payment stats").await
    }

    pub async fn create_payment(&self, draft: &NewPayment) -> Result<Payment, GatewayError> {
        let request = GatewayRequest::post("/payments").json(draft)?;
        self.fetch(request, "payment").await
    }

    pub async fn update_payment_status(
        &self,
        id: &EntityId,
        status: PaymentStatus,
    ) -> Result<(), GatewayError> {
        let request = GatewayRequest::patch(format!("/payments/{}/status", id))
            .json(&json!({ "status": status }))?;
        self.execute(request).await.map(drop)
    }

    pub async fn send_reminder(
        &self,
        id: &EntityId,
        channel: ReminderChannel,
    ) -> Result<(), GatewayError> {
        let request = GatewayRequest::post(format!("/reminders/{}/{}", id, channel));
        self.execute(request).await.map(drop)
    }

    pub async fn import_payments(&self, file: &ImportFile) -> Result<(), GatewayError> {
        let request = GatewayRequest::post("/payments/import").file(
            "file",
            file.file_name.clone(),
            file.content.clone(),
        );
        self.execute(request).await.map(drop)
    }

    /// Returns the raw export body
    pub async fn export_payments(&self, export: &ExportRequest) -> Result<Vec<u8>, GatewayError> {
        let request = GatewayRequest::post("/payments/export").json(export)?;
        self.execute(request).await
    }

    // === Members / Staff ===

    pub async fn list_entities<T: Entity>(&self) -> Result<Page<T>, GatewayError> {
        let path = format!("/{}", T::resource_name());
        self.fetch(GatewayRequest::get(path), T::labels().plural).await
    }

    pub async fn get_entity<T: Entity>(&self, id: &EntityId) -> Result<T, GatewayError> {
        let path = format!("/{}/{}", T::resource_name(), id);
        self.fetch(GatewayRequest::get(path), T::labels().record).await
    }

    pub async fn create_entity<T: Entity>(&self, draft: &T::Draft) -> Result<T, GatewayError> {
        let request = GatewayRequest::post(format!("/{}", T::resource_name())).json(draft)?;
        self.fetch(request, T::labels().record).await
    }

    pub async fn update_entity_status<T: Entity>(
        &self,
        id: &EntityId,
        status: &str,
    ) -> Result<(), GatewayError> {
        let request = GatewayRequest::patch(format!("/{}/{}/status", T::resource_name(), id))
            .json(&json!({ "status": status }))?;
        self.execute(request).await.map(drop)
    }

    pub async fn delete_entity<T: Entity>(&self, id: &EntityId) -> Result<(), GatewayError> {
        let request = GatewayRequest::delete(format!("/{}/{}", T::resource_name(), id));
        self.execute(request).await.map(drop)
    }
}
