//! Saga error types.
//!
//! None of these escape a saga run: the coordinator folds every one of them
//! into the failing step's outcome detail.

use std::time::Duration;

use thiserror::Error;

use crate::steps::StepName;

/// Errors raised by a step transport before any response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not send the request or read the response.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The downstream service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while executing a saga step.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A step needed an artifact from an earlier step that was not produced.
    #[error("Step '{step}' requires {needs}, which no earlier step produced")]
    MissingPriorArtifact {
        step: StepName,
        needs: &'static str,
    },

    /// The call did not complete within the step's timeout.
    #[error("Request timed out after {}", format_duration(.after))]
    Timeout { after: Duration },

    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;

fn format_duration(duration: &Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
