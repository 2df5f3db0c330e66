//! Generic store for list/detail records such as members and staff

use super::{LoadingGuard, TrackedState, read, write};
use crate::core::events::{EntityEvent, EventBus, EventEnvelope, StoreEvent};
use crate::core::reminders::{self, PlannedMembershipReminder};
use crate::core::{Entity, EntityId, FitHubError, FitHubResult};
use crate::entities::{Member, Staff};
use crate::gateway::ApiClient;
use chrono::NaiveDate;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use validator::Validate;

pub type MemberStore = EntityStore<Member>;
pub type StaffStore = EntityStore<Staff>;

/// Observable state of an [`EntityStore`]
#[derive(Debug, Clone)]
pub struct EntityState<T> {
    pub items: Vec<T>,
    /// Record shown in a detail view
    pub current: Option<T>,
    pub error: Option<String>,
    in_flight: usize,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            error: None,
            in_flight: 0,
        }
    }
}

impl<T> EntityState<T> {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

impl<T> TrackedState for EntityState<T> {
    fn in_flight_mut(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

/// In-memory copy of one backend collection
///
/// Local state only changes after the backend confirmed the operation.
pub struct EntityStore<T: Entity> {
    api: ApiClient,
    events: EventBus,
    state: RwLock<EntityState<T>>,
    fetch_seq: AtomicU64,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(api: ApiClient, events: EventBus) -> Self {
        Self {
            api,
            events,
            state: RwLock::new(EntityState::default()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> EntityState<T> {
        read(&self.state).clone()
    }

    pub fn items(&self) -> Vec<T> {
        read(&self.state).items.clone()
    }

    pub fn current(&self) -> Option<T> {
        read(&self.state).current.clone()
    }

    /// Loaded record with the given id
    pub fn find(&self, id: &EntityId) -> Option<T> {
        read(&self.state).items.iter().find(|i| i.id() == id).cloned()
    }

    pub fn active_items(&self) -> Vec<T> {
        read(&self.state)
            .items
            .iter()
            .filter(|i| i.is_active())
            .cloned()
            .collect()
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

    fn publish(&self, event: EntityEvent) {
        self.events.publish(StoreEvent::Entity(event));
    }

    fn fail(&self, operation: &'static str, fallback: String, err: FitHubError) -> FitHubError {
        let message = err.user_message(&fallback);
        tracing::warn!(store = T::resource_name(), operation, error = %err, "{}", message);
        write(&self.state).error = Some(message.clone());
        self.events.publish(StoreEvent::Failed {
            store: T::resource_name().to_string(),
            operation: operation.to_string(),
            message,
        });
        err
    }

    /// Replace the collection; the newest of overlapping calls wins
    pub async fn fetch_all(&self) -> FitHubResult<()> {
        let ticket = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::begin(&self.state);

        let result = self.api.list_entities::<T>().await;

        let mut state = write(&self.state);
        if self.fetch_seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!(store = T::resource_name(), ticket, "Discarding superseded response");
            return result.map(drop).map_err(FitHubError::from);
        }

        match result {
            Ok(page) => {
                state.items = page.content;
                let total = state.items.len();
                drop(state);

                tracing::info!(store = T::resource_name(), total, "Records loaded");
                self.publish(EntityEvent::Loaded {
                    entity_type: T::resource_name().to_string(),
                    total,
                });
                Ok(())
            }
            Err(err) => {
                drop(state);
                let fallback = T::labels().fetch_all_failed();
                Err(self.fail("fetch_all", fallback, err.into()))
            }
        }
    }

    /// Load one record into the detail slot
    pub async fn fetch_by_id(&self, id: &EntityId) -> FitHubResult<T> {
        let _loading = LoadingGuard::begin(&self.state);
        let record = match self.api.get_entity::<T>(id).await {
            Ok(record) => record,
            Err(err) => {
                let fallback = T::labels().fetch_one_failed();
                return Err(self.fail("fetch_by_id", fallback, err.into()));
            }
        };

        write(&self.state).current = Some(record.clone());
        self.publish(EntityEvent::Selected {
            entity_type: T::resource_name().to_string(),
            entity_id: record.id().clone(),
        });
        Ok(record)
    }

    /// Validate a draft, create it on the backend and append the result
    pub async fn create(&self, draft: T::Draft) -> FitHubResult<T> {
        if let Err(errors) = draft.validate() {
            tracing::debug!(store = T::resource_name(), "Draft rejected locally");
            return Err(errors.into());
        }

        let _loading = LoadingGuard::begin(&self.state);
        let record = match self.api.create_entity::<T>(&draft).await {
            Ok(record) => record,
            Err(err) => {
                let fallback = T::labels().create_failed();
                return Err(self.fail("create", fallback, err.into()));
            }
        };

        write(&self.state).items.push(record.clone());
        tracing::info!(store = T::resource_name(), id = %record.id(), "Record created");
        self.publish(EntityEvent::Created {
            entity_type: T::resource_name().to_string(),
            entity_id: record.id().clone(),
        });
        Ok(record)
    }

    /// Change a record's status in the list and in the detail slot
    pub async fn update_status(&self, id: &EntityId, status: &str) -> FitHubResult<()> {
        let _loading = LoadingGuard::begin(&self.state);
        if let Err(err) = self.api.update_entity_status::<T>(id, status).await {
            let fallback = T::labels().update_status_failed();
            return Err(self.fail("update_status", fallback, err.into()));
        }

        {
            let mut state = write(&self.state);
            match state.items.iter_mut().find(|i| i.id() == id) {
                Some(item) => item.set_status(status),
                None => tracing::warn!(
                    store = T::resource_name(),
                    %id,
                    "Status updated for a record not loaded locally"
                ),
            }
            if let Some(current) = state.current.as_mut().filter(|c| c.id() == id) {
                current.set_status(status);
            }
        }

        self.publish(EntityEvent::StatusChanged {
            entity_type: T::resource_name().to_string(),
            entity_id: id.clone(),
            status: status.to_string(),
        });
        Ok(())
    }

    /// Delete a record, clearing the detail slot when it shows that record
    pub async fn delete(&self, id: &EntityId) -> FitHubResult<()> {
        let _loading = LoadingGuard::begin(&self.state);
        if let Err(err) = self.api.delete_entity::<T>(id).await {
            let fallback = T::labels().delete_failed();
            return Err(self.fail("delete", fallback, err.into()));
        }

        {
            let mut state = write(&self.state);
            state.items.retain(|i| i.id() != id);
            if state.current.as_ref().is_some_and(|c| c.id() == id) {
                state.current = None;
            }
        }

        tracing::info!(store = T::resource_name(), %id, "Record deleted");
        self.publish(EntityEvent::Deleted {
            entity_type: T::resource_name().to_string(),
            entity_id: id.clone(),
        });
        Ok(())
    }
}

impl EntityStore<Member> {
    /// Loaded members whose membership runs out within `within_days` of `today`
    pub fn expiring_members(&self, today: NaiveDate, within_days: i64) -> Vec<Member> {
        let state = read(&self.state);
        reminders::expiring_members(&state.items, today, within_days)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Membership expiry reminders due on `today` for the loaded members
    pub fn plan_membership_reminders(&self, today: NaiveDate) -> Vec<PlannedMembershipReminder> {
        let planned = reminders::plan_membership_reminders(&read(&self.state).items, today);
        tracing::debug!(
            store = Member::resource_name(),
            %today,
            planned = planned.len(),
            "Membership reminders planned"
        );
        planned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayResponse, Method, ScriptedGateway};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_default_message_uses_record_label() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.respond(Method::Delete, "/staff/3", GatewayResponse::empty(500));
        let store = StaffStore::new(ApiClient::new(gateway.clone()), EventBus::new(16));

        assert!(store.delete(&EntityId::new("3")).await.is_err());
        assert_eq!(store.error().as_deref(), Some("Failed to delete staff member"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_active_items() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.respond(
            Method::Get,
            "/members",
            GatewayResponse::ok_json(json!({"content": [
                {"id": 1, "name": "Ann", "status": "active"},
                {"id": 2, "name": "Bob", "status": "inactive"}
            ]})),
        );
        let store = MemberStore::new(ApiClient::new(gateway.clone()), EventBus::new(16));

        store.fetch_all().await.unwrap();
        let active = store.active_items();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Ann");
        assert_eq!(store.find(&EntityId::new("2")).map(|m| m.name), Some("Bob".to_string()));
    }
}
