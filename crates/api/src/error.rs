//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::TransportError;

/// API-level error type that maps to HTTP responses.
///
/// A saga that ends in `Error` is not an `ApiError`: its report is returned
/// as a normal response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not a usable booking context.
    #[error("Invalid request body: {0}")]
    BadRequest(#[from] JsonRejection),

    /// The run was torn down before it produced a report.
    #[error("Confirmation was abandoned before it finished")]
    Abandoned,

    /// The outbound transport could not be set up.
    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(rejection) => rejection.status(),
            ApiError::Abandoned => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Transport(_) => {
                tracing::error!(error = %self, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
