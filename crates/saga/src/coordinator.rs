//! Saga coordinator for the post-purchase confirmation workflow.

use std::time::Instant;

use common::RunId;
use domain::BookingContext;

use crate::config::SagaConfig;
use crate::context::CallerContext;
use crate::events::SagaProgress;
use crate::link::LinkNormalizer;
use crate::outcome::{SagaReport, StepOutcome};
use crate::state::SagaState;
use crate::steps::{
    ConfirmationStep, CreateRecord, GenerateDocument, SendEmail, SendSms, StepInput,
};
use crate::transport::StepTransport;

/// Orchestrates confirmation runs.
///
/// Drives a 4-step saga (record → document → email → SMS). Record creation
/// is fatal; the three follow-on steps always run, in order, once the record
/// exists. There is no compensation and no retry: each step is attempted at
/// most once per run.
pub struct SagaCoordinator<T>
where
    T: StepTransport,
{
    transport: T,
    record: Box<dyn ConfirmationStep>,
    follow_ons: Vec<Box<dyn ConfirmationStep>>,
}

/// Mutable bookkeeping for one run. Never shared between runs.
struct SagaRun {
    run_id: RunId,
    state: SagaState,
    outcomes: Vec<StepOutcome>,
}

impl SagaRun {
    fn new() -> Self {
        Self {
            run_id: RunId::new(),
            state: SagaState::default(),
            outcomes: Vec::new(),
        }
    }

    fn advance(&mut self, next: SagaState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal saga transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(run_id = %self.run_id, from = %self.state, to = %next, "saga transition");
        self.state = next;
    }
}

impl<T> SagaCoordinator<T>
where
    T: StepTransport,
{
    /// Creates a coordinator with the four standard steps.
    pub fn new(config: &SagaConfig, transport: T) -> Self {
        let links = LinkNormalizer::from_settings(&config.links);
        Self {
            transport,
            record: Box::new(CreateRecord::new(config.record.clone())),
            follow_ons: vec![
                Box::new(GenerateDocument::new(
                    config.document.clone(),
                    config.document_kind.clone(),
                    links,
                )),
                Box::new(SendEmail::new(config.email.clone())),
                Box::new(SendSms::new(config.sms.clone())),
            ],
        }
    }

    /// Runs one confirmation saga for the given booking context.
    ///
    /// Returns the report, or `None` if the caller context was torn down
    /// before the run finished. Every re-entry starts a fresh run.
    #[tracing::instrument(skip_all, fields(saga_type = "BookingConfirmation"))]
    pub async fn run(&self, booking: &BookingContext, caller: &CallerContext) -> Option<SagaReport> {
        metrics::counter!("confirmation_saga_runs_total").increment(1);
        let started = Instant::now();
        let mut run = SagaRun::new();

        if !caller.emit(SagaProgress::Validating) {
            return None;
        }

        let booking = match booking.validate() {
            Ok(booking) => booking,
            Err(error) => {
                tracing::warn!(run_id = %run.run_id, %error, "booking rejected");
                run.advance(SagaState::Finalized);
                let report = SagaReport::rejected(run.run_id, error);
                return self.finish(report, caller, started);
            }
        };

        let steps = std::iter::once(&self.record).chain(self.follow_ons.iter());
        for step in steps {
            let name = step.name();
            run.advance(SagaState::running(name));
            if !caller.emit(SagaProgress::StepStarted { step: name }) {
                return None;
            }
            tracing::info!(run_id = %run.run_id, step = %name, "saga step started");

            let input = StepInput {
                run_id: run.run_id,
                booking: &booking,
                prior: &run.outcomes,
            };
            let outcome = step.execute(&input, &self.transport).await;

            if !caller.is_live() {
                tracing::debug!(run_id = %run.run_id, step = %name, "caller gone, discarding outcome");
                return None;
            }

            let succeeded = outcome.succeeded();
            if succeeded {
                tracing::info!(run_id = %run.run_id, step = %name, "saga step completed");
            } else {
                metrics::counter!("confirmation_step_failures_total", "step" => name.as_str())
                    .increment(1);
                tracing::warn!(
                    run_id = %run.run_id,
                    step = %name,
                    detail = outcome.detail().unwrap_or_default(),
                    fatal = name.is_fatal(),
                    "saga step failed"
                );
            }
            run.outcomes.push(outcome);
            caller.emit(SagaProgress::StepFinished {
                step: name,
                succeeded,
            });

            if !succeeded && name.is_fatal() {
                break;
            }
        }

        run.advance(SagaState::Finalized);
        let report = SagaReport::aggregate(run.run_id, run.outcomes);
        self.finish(report, caller, started)
    }

    fn finish(
        &self,
        report: SagaReport,
        caller: &CallerContext,
        started: Instant,
    ) -> Option<SagaReport> {
        let status = report.status();
        if !caller.emit(SagaProgress::Finalized { status }) {
            return None;
        }

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("confirmation_saga_duration_seconds").record(duration);
        metrics::counter!("confirmation_saga_completed", "status" => status.as_str())
            .increment(1);
        tracing::info!(
            run_id = %report.run_id(),
            %status,
            record_id = report.record_id().map(|id| id.as_str()).unwrap_or_default(),
            duration,
            "saga finalized"
        );

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OverallStatus;
    use crate::steps::StepName;
    use crate::transport::InMemoryTransport;
    use serde_json::json;

    fn config() -> SagaConfig {
        SagaConfig::default()
    }

    fn booking() -> BookingContext {
        serde_json::from_value(json!({
            "requester": {"id": "42", "email": "ana@example.com", "phone": "+15551234567"},
            "record": {
                "start_date": "2025-01-05",
                "end_date": "2025-01-12",
                "coverage_amount": 50000,
                "premium": 120
            }
        }))
        .unwrap()
    }

    fn setup() -> (SagaCoordinator<InMemoryTransport>, InMemoryTransport, SagaConfig) {
        let config = config();
        let transport = InMemoryTransport::new();
        transport.respond(&config.record.endpoint, 201, json!({"id": 17}));
        transport.respond(
            &config.document.endpoint,
            200,
            json!({"document_url": "http://host.docker.internal:8004/documents/policy_17.pdf"}),
        );
        transport.respond(&config.email.endpoint, 200, json!({"id": "msg-1"}));
        transport.respond(&config.sms.endpoint, 200, json!({"sid": "SM1"}));
        let coordinator = SagaCoordinator::new(&config, transport.clone());
        (coordinator, transport, config)
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (coordinator, transport, config) = setup();

        let report = coordinator
            .run(&booking(), &CallerContext::new())
            .await
            .unwrap();

        assert_eq!(report.status(), OverallStatus::Success);
        assert_eq!(report.outcomes().len(), 4);
        assert_eq!(report.record_id().unwrap().as_str(), "17");
        assert_eq!(
            report.document_url(),
            Some("http://localhost:8004/documents/policy_17.pdf")
        );
        assert_eq!(transport.calls().len(), 4);
        assert_eq!(transport.call_count(&config.sms.endpoint), 1);
    }

    #[tokio::test]
    async fn test_record_failure_skips_follow_ons() {
        let (coordinator, transport, config) = setup();
        transport.respond(&config.record.endpoint, 500, json!({"detail": "db down"}));

        let report = coordinator
            .run(&booking(), &CallerContext::new())
            .await
            .unwrap();

        assert_eq!(report.status(), OverallStatus::Error);
        assert_eq!(report.outcomes().len(), 1);
        assert_eq!(transport.calls().len(), 1);
        assert!(!report.attempted(StepName::GenerateDocument));
    }

    #[tokio::test]
    async fn test_invalid_booking_makes_no_calls() {
        let (coordinator, transport, _) = setup();
        let mut ctx = booking();
        ctx.requester.email = None;

        let report = coordinator.run(&ctx, &CallerContext::new()).await.unwrap();

        assert_eq!(report.status(), OverallStatus::Error);
        assert!(report.outcomes().is_empty());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_torn_down_before_start_yields_nothing() {
        let (coordinator, transport, _) = setup();
        let (caller, mut rx) = CallerContext::with_progress();
        caller.tear_down();

        assert!(coordinator.run(&booking(), &caller).await.is_none());
        assert!(transport.calls().is_empty());
        assert!(rx.try_recv().is_err());
    }
}
