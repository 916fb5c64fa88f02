//! Outbound transport used by saga steps, with HTTP and in-memory implementations.

pub mod http;
pub mod memory;

pub use http::HttpTransport;
pub use memory::{InMemoryTransport, RecordedCall};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// A request built by a step, ready to be posted to its endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRequest {
    /// JSON body.
    pub body: Value,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl StepRequest {
    /// Creates a request with the given JSON body and no extra headers.
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: Vec::new(),
        }
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A response from a downstream service.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, if the body was JSON.
    pub body: Option<Value>,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns a top-level field of the body, ignoring JSON nulls.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body
            .as_ref()
            .and_then(|body| body.get(name))
            .filter(|value| !value.is_null())
    }

    /// Returns the failure explanation the service itself reported.
    ///
    /// Prefers the `detail` field, then the `error` field.
    pub fn reported_detail(&self) -> Option<String> {
        ["detail", "error"]
            .iter()
            .filter_map(|name| self.field(name))
            .find_map(describe)
    }

    /// Explains why this response counts as a failure, falling back to the
    /// status code when the service reported nothing.
    pub fn failure_detail(&self) -> String {
        self.reported_detail()
            .unwrap_or_else(|| format!("Status {}.", self.status))
    }
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Transport that posts step requests to downstream services.
#[async_trait]
pub trait StepTransport: Send + Sync {
    /// Posts a JSON request to the endpoint and returns the raw response.
    ///
    /// Only failures to obtain a response are errors; non-2xx statuses are
    /// returned as ordinary responses.
    async fn post_json(
        &self,
        endpoint: &str,
        request: &StepRequest,
    ) -> Result<TransportResponse, TransportError>;
}
