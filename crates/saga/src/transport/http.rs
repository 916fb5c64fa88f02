//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;

use super::{StepRequest, StepTransport, TransportResponse};
use crate::error::TransportError;

/// Posts step requests over HTTP with a shared connection pool.
///
/// Timeouts are enforced by the coordinator per step, not by the client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("confirmation-saga/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StepTransport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        request: &StepRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.post(endpoint).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).ok();

        tracing::debug!(%endpoint, status, json_body = body.is_some(), "downstream responded");
        Ok(TransportResponse { status, body })
    }
}
