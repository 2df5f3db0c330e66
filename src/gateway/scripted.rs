//! Scripted in-memory gateway for testing and offline development
//!
//! Responses are queued per route (`"GET /payments"`). Each request pops the
//! next queued outcome; the last one stays in place and answers every
//! further request. Unscripted routes answer 404.

use super::{Gateway, GatewayRequest, GatewayResponse, Method};
use crate::core::GatewayError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Scripted {
    delay: Option<Duration>,
    outcome: Result<GatewayResponse, GatewayError>,
}

#[derive(Debug, Default)]
pub struct ScriptedGateway {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn route_key(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) -> &Self {
        lock(&self.routes)
            .entry(route_key(method, path))
            .or_default()
            .push_back(scripted);
        self
    }

    /// Queue a response for `method path`
    pub fn respond(&self, method: Method, path: &str, response: GatewayResponse) -> &Self {
        self.push(
            method,
            path,
            Scripted {
                delay: None,
                outcome: Ok(response),
            },
        )
    }

    /// Queue a response delivered after `delay`
    pub fn respond_after(
        &self,
        method: Method,
        path: &str,
        delay: Duration,
        response: GatewayResponse,
    ) -> &Self {
        self.push(
            method,
            path,
            Scripted {
                delay: Some(delay),
                outcome: Ok(response),
            },
        )
    }

    /// Queue a transport failure
    pub fn fail(&self, method: Method, path: &str, error: GatewayError) -> &Self {
        self.push(
            method,
            path,
            Scripted {
                delay: None,
                outcome: Err(error),
            },
        )
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<GatewayRequest> {
        lock(&self.requests).clone()
    }

    /// Requests received for one route
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<GatewayRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn next_outcome(&self, key: &str) -> Option<Scripted> {
        let mut routes = lock(&self.routes);
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let key = request.route();
        lock(&self.requests).push(request);

        let Some(scripted) = self.next_outcome(&key) else {
            tracing::warn!(route = %key, "No scripted response");
            return Ok(GatewayResponse::empty(404));
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.outcome
    }
}
