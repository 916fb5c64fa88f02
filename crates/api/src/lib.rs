//! HTTP API server exposing the post-purchase confirmation saga.
//!
//! Provides a synchronous and a streaming (SSE) confirmation endpoint, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{CompletionScheduler, HttpTransport, SagaCoordinator, StepTransport};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::ApiError;
use routes::confirmations::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<T: StepTransport + 'static>(
    state: Arc<AppState<T>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::observability::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::observability::health))
        .route("/confirmations", post(routes::confirmations::confirm::<T>))
        .route(
            "/confirmations/stream",
            post(routes::confirmations::confirm_stream::<T>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state around the given transport.
pub fn create_state<T: StepTransport>(config: &Config, transport: T) -> Arc<AppState<T>> {
    Arc::new(AppState {
        coordinator: SagaCoordinator::new(&config.saga, transport),
        scheduler: CompletionScheduler::new(config.saga.follow_up.clone()),
        keep_alive: config.keep_alive,
    })
}

/// Creates the default application state, talking to the real services over HTTP.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState<HttpTransport>>, ApiError> {
    let transport = HttpTransport::new()?;
    Ok(create_state(config, transport))
}
