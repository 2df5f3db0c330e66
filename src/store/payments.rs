//! Payment store: base collection, filters, filtered view and stats
//!
//! The filtered view is always `apply_filters(payments, filters)` except
//! right after a status update, where the touched row keeps its place until
//! the next fetch or filter change.

use super::{DispatchReport, LoadingGuard, TrackedState, read, write};
use crate::core::events::{EventBus, EventEnvelope, PaymentEvent, StoreEvent};
use crate::core::query::{FilterUpdate, PaymentFilters, apply_filters};
use crate::core::reminders::{self, PlannedReminder};
use crate::core::stats::PaymentStats;
use crate::core::{EntityId, FitHubError, FitHubResult};
use crate::entities::{
    ExportFormat, ExportRequest, ExportedFile, ImportFile, NewPayment, Payment, PaymentStatus,
    ReminderChannel,
};
use crate::gateway::ApiClient;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use validator::Validate;

const STORE: &str = "payments";

pub const FETCH_PAYMENTS_FAILED: &str = "Failed to fetch payments";
pub const FETCH_STATS_FAILED: &str = "Failed to fetch payment stats";
pub const CREATE_PAYMENT_FAILED: &str = "Failed to create payment";
pub const UPDATE_STATUS_FAILED: &str = "Failed to update payment status";
pub const IMPORT_FAILED: &str = "Failed to import payments";
pub const EXPORT_FAILED: &str = "Failed to export payments";

fn reminder_failed(channel: ReminderChannel) -> String {
    format!("Failed to send {} reminder", channel)
}

/// Observable state of the payment store
#[derive(Debug, Clone, Default)]
pub struct PaymentsState {
    pub payments: Vec<Payment>,
    pub filtered_payments: Vec<Payment>,
    pub filters: PaymentFilters,
    pub stats: PaymentStats,
    pub error: Option<String>,
    in_flight: usize,
}

impl PaymentsState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

impl TrackedState for PaymentsState {
    fn in_flight_mut(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

/// Payment collection plus the filter/stats engine
pub struct PaymentStore {
    api: ApiClient,
    events: EventBus,
    state: RwLock<PaymentsState>,
    fetch_seq: AtomicU64,
    stats_seq: AtomicU64,
}

impl PaymentStore {
    pub fn new(api: ApiClient, events: EventBus) -> Self {
        Self {
            api,
            events,
            state: RwLock::new(PaymentsState::default()),
            fetch_seq: AtomicU64::new(0),
            stats_seq: AtomicU64::new(0),
        }
    }

    // === Accessors ===

    /// Consistent copy of the whole state
    pub fn snapshot(&self) -> PaymentsState {
        read(&self.state).clone()
    }

    pub fn payments(&self) -> Vec<Payment> {
        read(&self.state).payments.clone()
    }

    pub fn filtered_payments(&self) -> Vec<Payment> {
        read(&self.state).filtered_payments.clone()
    }

    pub fn filters(&self) -> PaymentFilters {
        read(&self.state).filters.clone()
    }

    pub fn stats(&self) -> PaymentStats {
        read(&self.state).stats.clone()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).is_loading()
    }

    pub fn error(&self) -> Option<String> {
        read(&self.state).error.clone()
    }

    pub fn clear_error(&self) {
        write(&self.state).error = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    /// Drop all loaded data and filters
    pub fn reset(&self) {
        let mut state = write(&self.state);
        let in_flight = state.in_flight;
        *state = PaymentsState {
            in_flight,
            ..PaymentsState::default()
        };
    }

    fn publish(&self, event: PaymentEvent) {
        self.events.publish(StoreEvent::Payment(event));
    }

    /// Record a failed operation and hand the error back to the caller
    fn fail(&self, operation: &'static str, fallback: &str, err: FitHubError) -> FitHubError {
        let message = err.user_message(fallback);
        tracing::warn!(store = STORE, operation, error = %err, "{}", message);
        write(&self.state).error = Some(message.clone());
        self.events.publish(StoreEvent::Failed {
            store: STORE.to_string(),
            operation: operation.to_string(),
            message,
        });
        err
    }

    // === Filters ===

    /// Change one filter field and re-derive the filtered view
    pub fn set_filter(&self, update: FilterUpdate) {
        let key = update.key();
        let visible = {
            let mut state = write(&self.state);
            state.filters.apply(update);
            state.filtered_payments = apply_filters(&state.payments, &state.filters);
            state.filtered_payments.len()
        };
        tracing::debug!(store = STORE, filter = key, visible, "Filter changed");
        self.publish(PaymentEvent::FiltersChanged { visible });
    }

    /// Reset every filter field; the filtered view becomes the base collection
    pub fn clear_filters(&self) {
        let visible = {
            let mut state = write(&self.state);
            state.filters = PaymentFilters::default();
            state.filtered_payments = state.payments.clone();
            state.filtered_payments.len()
        };
        self.publish(PaymentEvent::FiltersChanged { visible });
    }

    // === Fetching ===

    /// Replace the base collection from the backend
    ///
    /// Filters persist across the refetch. When a newer fetch was started
    /// while this one was in flight, this response is discarded and its
    /// outcome only reaches the caller.
    pub async fn fetch_payments(&self) -> FitHubResult<()> {
        let ticket = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::begin(&self.state);

        let result = self.api.list_payments().await;

        let mut state = write(&self.state);
        if self.fetch_seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!(store = STORE, ticket, "Discarding superseded payments response");
            return result.map(drop).map_err(FitHubError::from);
        }

        match result {
            Ok(page) => {
                if page.is_partial() {
                    tracing::debug!(
                        store = STORE,
                        received = page.content.len(),
                        total = ?page.total_elements,
                        "Backend returned a partial page"
                    );
                }
                state.filtered_payments = apply_filters(&page.content, &state.filters);
                state.payments = page.content;
                let (total, visible) = (state.payments.len(), state.filtered_payments.len());
                drop(state);

                tracing::info!(store = STORE, total, visible, "Payments loaded");
                self.publish(PaymentEvent::Loaded { total, visible });
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.fail("fetch_payments", FETCH_PAYMENTS_FAILED, err.into()))
            }
        }
    }

    /// Replace the stats snapshot from the backend
    pub async fn fetch_payment_stats(&self) -> FitHubResult<()> {
        let ticket = self.stats_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::begin(&self.state);

        let result = self.api.payment_stats().await;

        let mut state = write(&self.state);
        if self.stats_seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!(store = STORE, ticket, "Discarding superseded stats response");
            return result.map(drop).map_err(FitHubError::from);
        }

        match result {
            Ok(stats) => {
                state.stats = stats;
                drop(state);
                self.publish(PaymentEvent::StatsRefreshed);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.fail("fetch_payment_stats", FETCH_STATS_FAILED, err.into()))
            }
        }
    }

    // === Mutations ===

    /// Validate and create a payment
    ///
    /// The created payment is appended to the base collection, and to the
    /// filtered view when it matches the active filters.
    pub async fn create_payment(&self, draft: NewPayment) -> FitHubResult<Payment> {
        if let Err(errors) = draft.validate() {
            tracing::debug!(store = STORE, "Payment draft rejected locally");
            return Err(errors.into());
        }

        let _loading = LoadingGuard::begin(&self.state);
        let payment = match self.api.create_payment(&draft).await {
            Ok(payment) => payment,
            Err(err) => return Err(self.fail("create_payment", CREATE_PAYMENT_FAILED, err.into())),
        };

        {
            let mut state = write(&self.state);
            if state.filters.matches(&payment) {
                state.filtered_payments.push(payment.clone());
            }
            state.payments.push(payment.clone());
        }

        tracing::info!(store = STORE, payment_id = %payment.id, "Payment created");
        self.publish(PaymentEvent::Created {
            payment_id: payment.id.clone(),
        });
        Ok(payment)
    }

    /// Change a payment's status
    ///
    /// On success the matching row is updated in place in both the base
    /// collection and the filtered view, without re-filtering.
    pub async fn update_payment_status(
        &self,
        id: &EntityId,
        status: PaymentStatus,
    ) -> FitHubResult<()> {
        let _loading = LoadingGuard::begin(&self.state);
        if let Err(err) = self.api.update_payment_status(id, status).await {
            return Err(self.fail("update_payment_status", UPDATE_STATUS_FAILED, err.into()));
        }

        let previous = {
            let mut state = write(&self.state);
            let previous = state
                .payments
                .iter_mut()
                .find(|p| &p.id == id)
                .map(|p| std::mem::replace(&mut p.status, status));
            if let Some(p) = state.filtered_payments.iter_mut().find(|p| &p.id == id) {
                p.status = status;
            }
            previous
        };

        match previous {
            Some(from) if from != status && !from.can_transition_to(status) => {
                tracing::warn!(
                    store = STORE,
                    payment_id = %id,
                    %from,
                    to = %status,
                    "Unexpected payment status transition"
                );
            }
            Some(_) => {}
            None => {
                let missing = FitHubError::NotFound {
                    entity_type: "payment".to_string(),
                    id: id.to_string(),
                };
                tracing::warn!(store = STORE, error = %missing, "Status updated for a payment not loaded locally");
            }
        }

        self.publish(PaymentEvent::StatusChanged {
            payment_id: id.clone(),
            status,
        });
        Ok(())
    }

    /// Ask the backend to send a reminder; no local state changes
    pub async fn send_reminder(&self, id: &EntityId, channel: ReminderChannel) -> FitHubResult<()> {
        let _loading = LoadingGuard::begin(&self.state);
        if let Err(err) = self.api.send_reminder(id, channel).await {
            return Err(self.fail("send_reminder", &reminder_failed(channel), err.into()));
        }

        tracing::info!(store = STORE, payment_id = %id, %channel, "Reminder sent");
        self.publish(PaymentEvent::ReminderSent {
            payment_id: id.clone(),
            channel,
        });
        Ok(())
    }

    // === Import / Export ===

    /// Upload a payments file, then reload the collection
    pub async fn import_payments(&self, file: ImportFile) -> FitHubResult<()> {
        {
            let _loading = LoadingGuard::begin(&self.state);
            if let Err(err) = self.api.import_payments(&file).await {
                return Err(self.fail("import_payments", IMPORT_FAILED, err.into()));
            }
        }

        tracing::info!(store = STORE, file_name = %file.file_name, bytes = file.content.len(), "Payments imported");
        self.publish(PaymentEvent::Imported {
            file_name: file.file_name,
        });
        self.fetch_payments().await
    }

    /// Request an export and return the produced file
    pub async fn export_payments(&self, request: &ExportRequest) -> FitHubResult<ExportedFile> {
        let _loading = LoadingGuard::begin(&self.state);
        let content = match self.api.export_payments(request).await {
            Ok(content) => content,
            Err(err) => return Err(self.fail("export_payments", EXPORT_FAILED, err.into())),
        };

        let file = ExportedFile {
            file_name: request.file_name_at(Utc::now()),
            content,
        };
        self.publish(PaymentEvent::Exported {
            file_name: file.file_name.clone(),
            bytes: file.content.len(),
        });
        Ok(file)
    }

    /// Export whatever the active filters select
    pub async fn export_filtered(&self, format: ExportFormat) -> FitHubResult<ExportedFile> {
        let request = ExportRequest::from_filters(&self.filters()).with_format(format);
        self.export_payments(&request).await
    }

    // === Due-date housekeeping ===

    /// Loaded pending payments whose due date is before `today`
    pub fn overdue_candidates(&self, today: NaiveDate) -> Vec<EntityId> {
        reminders::overdue_candidates(&read(&self.state).payments, today)
    }

    /// Mark every overdue candidate as overdue on the backend
    pub async fn sweep_overdue(&self, today: NaiveDate) -> DispatchReport<EntityId> {
        let candidates = self.overdue_candidates(today);
        tracing::info!(store = STORE, candidates = candidates.len(), %today, "Sweeping overdue payments");

        let outcomes = join_all(candidates.iter().map(|id| async move {
            let result = self.update_payment_status(id, PaymentStatus::Overdue).await;
            (id.clone(), result)
        }))
        .await;

        DispatchReport::from_outcomes(outcomes)
    }

    /// Reminders due on `today` for the loaded payments
    pub fn plan_reminders(&self, today: NaiveDate) -> Vec<PlannedReminder> {
        reminders::plan_reminders(&read(&self.state).payments, today)
    }

    /// Send every reminder planned for `today` concurrently
    pub async fn send_due_reminders(&self, today: NaiveDate) -> DispatchReport<PlannedReminder> {
        let plan = self.plan_reminders(today);
        tracing::info!(store = STORE, planned = plan.len(), %today, "Sending due reminders");

        let outcomes = join_all(plan.into_iter().map(|reminder| async move {
            let result = self.send_reminder(&reminder.payment_id, reminder.channel).await;
            (reminder, result)
        }))
        .await;

        DispatchReport::from_outcomes(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayResponse, Method, ScriptedGateway};
    use serde_json::json;
    use std::sync::Arc;

    fn store(gateway: &Arc<ScriptedGateway>) -> PaymentStore {
        PaymentStore::new(ApiClient::new(gateway.clone()), EventBus::new(64))
    }

    #[tokio::test]
    async fn test_starts_empty_and_idle() {
        let gateway = Arc::new(ScriptedGateway::new());
        let store = store(&gateway);

        let state = store.snapshot();
        assert!(state.payments.is_empty());
        assert!(state.filters.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_loading_is_cleared_after_failure() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.respond(Method::Get, "/payments/stats", GatewayResponse::empty(500));
        let store = store(&gateway);

        assert!(store.fetch_payment_stats().await.is_err());
        assert!(!store.is_loading());
        assert_eq!(store.error().as_deref(), Some(FETCH_STATS_FAILED));

        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_reset_keeps_nothing() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.respond(
            Method::Get,
            "/payments",
            GatewayResponse::ok_json(json!({"content": [{
                "id": 1, "member": {"name": "John Doe"}, "amount": 50,
                "type": "membership", "dueDate": "2024-01-15", "status": "pending"
            }]})),
        );
        let store = store(&gateway);
        store.fetch_payments().await.unwrap();
        store.set_filter(FilterUpdate::member_name("john"));

        store.reset();
        let state = store.snapshot();
        assert!(state.payments.is_empty());
        assert!(state.filtered_payments.is_empty());
        assert!(state.filters.is_empty());
    }
}
