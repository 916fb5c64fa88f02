//! In-memory transport for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{StepRequest, StepTransport, TransportResponse};
use crate::error::TransportError;

/// A request observed by the in-memory transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub request: StepRequest,
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(TransportResponse),
    Unavailable(String),
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    scripts: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    calls: Vec<RecordedCall>,
}

/// In-memory transport with scripted responses per endpoint.
///
/// Unscripted endpoints answer `404` with no body.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
}

impl InMemoryTransport {
    /// Creates a new in-memory transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the endpoint answer with the given status and JSON body.
    pub fn respond(&self, endpoint: &str, status: u16, body: Value) {
        self.script(
            endpoint,
            Scripted::Respond(TransportResponse::new(status, Some(body))),
        );
    }

    /// Makes the endpoint answer with the given status and a non-JSON body.
    pub fn respond_without_body(&self, endpoint: &str, status: u16) {
        self.script(
            endpoint,
            Scripted::Respond(TransportResponse::new(status, None)),
        );
    }

    /// Makes calls to the endpoint fail before any response.
    pub fn fail(&self, endpoint: &str, message: &str) {
        self.script(endpoint, Scripted::Unavailable(message.to_string()));
    }

    /// Delays every answer from the endpoint.
    pub fn delay(&self, endpoint: &str, delay: Duration) {
        self.state
            .write()
            .unwrap()
            .delays
            .insert(endpoint.to_string(), delay);
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Returns the number of calls made to the endpoint.
    pub fn call_count(&self, endpoint: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    /// Returns the most recent request sent to the endpoint.
    pub fn last_request(&self, endpoint: &str) -> Option<StepRequest> {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|call| call.endpoint == endpoint)
            .map(|call| call.request.clone())
    }

    fn script(&self, endpoint: &str, scripted: Scripted) {
        self.state
            .write()
            .unwrap()
            .scripts
            .insert(endpoint.to_string(), scripted);
    }
}

#[async_trait]
impl StepTransport for InMemoryTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        request: &StepRequest,
    ) -> Result<TransportResponse, TransportError> {
        let (scripted, delay) = {
            let mut state = self.state.write().unwrap();
            state.calls.push(RecordedCall {
                endpoint: endpoint.to_string(),
                request: request.clone(),
            });
            (
                state.scripts.get(endpoint).cloned(),
                state.delays.get(endpoint).copied(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Unavailable(message)) => Err(TransportError::Unavailable(message)),
            None => Ok(TransportResponse::new(404, None)),
        }
    }
}
