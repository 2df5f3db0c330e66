//! Client-side stores
//!
//! Each store owns its state behind a `std::sync::RwLock` that is only
//! held for synchronous updates, never across an `.await`. Mutations are
//! applied after the backend confirmed them and are then announced on the
//! shared [`EventBus`](crate::core::EventBus).

pub mod entities;
pub mod payments;

pub use entities::{EntityState, EntityStore, MemberStore, StaffStore};
pub use payments::{PaymentStore, PaymentsState};

use crate::core::FitHubError;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// Updates never leave state half-written, so a poisoned lock still holds
// usable data.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Loading and error bookkeeping shared by all store states
pub(crate) trait TrackedState {
    fn in_flight_mut(&mut self) -> &mut usize;
    fn error_mut(&mut self) -> &mut Option<String>;
}

/// Marks one operation as in flight for as long as it lives
///
/// Starting an operation clears the previous error. Loading stays on while
/// any guard is alive, so overlapping operations do not end each other's
/// loading state.
pub(crate) struct LoadingGuard<'a, S: TrackedState> {
    state: &'a RwLock<S>,
}

impl<'a, S: TrackedState> LoadingGuard<'a, S> {
    pub(crate) fn begin(state: &'a RwLock<S>) -> Self {
        {
            let mut guard = write(state);
            *guard.in_flight_mut() += 1;
            *guard.error_mut() = None;
        }
        Self { state }
    }
}

impl<S: TrackedState> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let mut guard = write(self.state);
        let in_flight = guard.in_flight_mut();
        *in_flight = in_flight.saturating_sub(1);
    }
}

/// Outcome of a batch of independent backend calls
#[derive(Debug)]
pub struct DispatchReport<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<(T, FitHubError)>,
}

impl<T> DispatchReport<T> {
    pub(crate) fn from_outcomes(outcomes: Vec<(T, Result<(), FitHubError>)>) -> Self {
        let mut report = Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (item, result) in outcomes {
            match result {
                Ok(()) => report.succeeded.push(item),
                Err(err) => report.failed.push((item, err)),
            }
        }
        report
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
