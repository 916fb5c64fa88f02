//! Confirmation endpoints: run the saga for a committed purchase.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use domain::BookingContext;
use futures_util::Stream;
use saga::{
    CallerContext, CompletionScheduler, FollowUp, OverallStatus, SagaCoordinator, SagaProgress,
    SagaReport, SagaState, StepOutcome, StepTransport,
};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<T: StepTransport> {
    pub coordinator: SagaCoordinator<T>,
    pub scheduler: CompletionScheduler,
    pub keep_alive: Duration,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub run_id: String,
    pub status: OverallStatus,
    pub message: String,
    pub record_id: Option<String>,
    pub document_url: Option<String>,
    pub steps: Vec<StepOutcome>,
    pub follow_up: Option<FollowUp>,
}

impl ConfirmationResponse {
    fn new(report: &SagaReport, follow_up: Option<FollowUp>) -> Self {
        Self {
            run_id: report.run_id().to_string(),
            status: report.status(),
            message: report.message(),
            record_id: report.record_id().map(|id| id.to_string()),
            document_url: report.document_url().map(str::to_string),
            steps: report.outcomes().to_vec(),
            follow_up,
        }
    }
}

/// Payload of a `progress` event.
#[derive(Serialize)]
struct ProgressFrame<'a> {
    #[serde(flatten)]
    progress: &'a SagaProgress,
    state: SagaState,
    line: String,
}

impl<'a> ProgressFrame<'a> {
    fn new(progress: &'a SagaProgress) -> Self {
        Self {
            progress,
            state: progress.state(),
            line: progress.status_line(),
        }
    }
}

// -- Handlers --

/// POST /confirmations: runs the saga to completion and returns its report.
///
/// A run that ends in `Error` is still a 200; the report carries the failure.
#[tracing::instrument(skip_all)]
pub async fn confirm<T: StepTransport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    payload: Result<Json<BookingContext>, JsonRejection>,
) -> Result<Json<ConfirmationResponse>, ApiError> {
    let Json(booking) = payload?;
    metrics::counter!("confirmation_requests_total", "mode" => "sync").increment(1);

    // Dropping the handler future (client went away) tears the run down.
    let caller = CallerContext::new();
    let _guard = caller.drop_guard();

    let report = state
        .coordinator
        .run(&booking, &caller)
        .await
        .ok_or(ApiError::Abandoned)?;
    let follow_up = state.scheduler.plan(&report);

    Ok(Json(ConfirmationResponse::new(&report, follow_up)))
}

/// POST /confirmations/stream: runs the saga and streams progress as SSE.
///
/// Emits `progress` events while the run is going, one `report` event, and
/// a `follow_up` event once its delay has passed. Disconnecting tears the
/// run down, after which nothing else is emitted.
#[tracing::instrument(skip_all)]
pub async fn confirm_stream<T: StepTransport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    payload: Result<Json<BookingContext>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(booking) = payload?;
    metrics::counter!("confirmation_requests_total", "mode" => "stream").increment(1);

    let (caller, progress) = CallerContext::with_progress();
    let guard = caller.drop_guard();
    let (tx, rx) = mpsc::unbounded_channel();
    let keep_alive = state.keep_alive;

    tokio::spawn(stream_run(state, booking, caller, progress, tx));

    // The guard lives as long as the response body does.
    let events = futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv().await.map(|event| (Ok(event), (rx, guard)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(keep_alive)))
}

async fn stream_run<T: StepTransport + 'static>(
    state: Arc<AppState<T>>,
    booking: BookingContext,
    caller: CallerContext,
    mut progress: mpsc::UnboundedReceiver<SagaProgress>,
    tx: mpsc::UnboundedSender<Event>,
) {
    let run = state.coordinator.run(&booking, &caller);
    tokio::pin!(run);

    let report = loop {
        tokio::select! {
            biased;
            Some(event) = progress.recv() => {
                let _ = tx.send(sse_event("progress", &ProgressFrame::new(&event)));
            }
            report = &mut run => break report,
        }
    };
    while let Ok(event) = progress.try_recv() {
        let _ = tx.send(sse_event("progress", &ProgressFrame::new(&event)));
    }

    let Some(report) = report else {
        tracing::debug!("client disconnected before the run finished");
        return;
    };

    let follow_up = state.scheduler.plan(&report);
    let _ = tx.send(sse_event(
        "report",
        &ConfirmationResponse::new(&report, follow_up),
    ));

    let scheduled = state.scheduler.schedule(&report, &caller, move |follow_up| async move {
        let _ = tx.send(sse_event("follow_up", &follow_up));
    });
    if let Some(scheduled) = scheduled {
        scheduled.fired().await;
    }
}

fn sse_event<S: Serialize>(name: &str, data: &S) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|error| {
            tracing::warn!(%error, event = name, "failed to encode SSE payload");
            Event::default().event(name).data("{}")
        })
}
