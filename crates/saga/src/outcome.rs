//! Per-step outcomes and their aggregation into a saga report.

use common::{RecordId, RunId};
use domain::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message;
use crate::steps::StepName;

/// The result of one attempted step. Immutable once created.
///
/// The artifact is kept as the JSON value the service returned, so it can be
/// passed on to later steps unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    step: StepName,
    succeeded: bool,
    artifact: Option<Value>,
    detail: Option<String>,
}

impl StepOutcome {
    /// A successful outcome with an optional artifact.
    pub fn success(step: StepName, artifact: Option<Value>) -> Self {
        Self {
            step,
            succeeded: true,
            artifact,
            detail: None,
        }
    }

    /// A failed outcome with an explanation and an optional salvaged artifact.
    pub fn failed(step: StepName, detail: impl Into<String>, artifact: Option<Value>) -> Self {
        Self {
            step,
            succeeded: false,
            artifact,
            detail: Some(detail.into()),
        }
    }

    pub fn step(&self) -> StepName {
        self.step
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn artifact(&self) -> Option<&Value> {
        self.artifact.as_ref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// The single verdict of a saga run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every attempted step succeeded.
    Success,
    /// The record exists but at least one follow-on step failed.
    Warning,
    /// Validation or record creation failed.
    Error,
}

impl OverallStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Success => "success",
            OverallStatus::Warning => "warning",
            OverallStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run ended in [`OverallStatus::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalFailure {
    /// The booking context was rejected before any call was made.
    Validation(ValidationError),
    /// The record could not be created.
    RecordCreation { detail: Option<String> },
}

/// The outcome of one saga run, handed to the caller exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaReport {
    run_id: RunId,
    outcomes: Vec<StepOutcome>,
    status: OverallStatus,
    fatal: Option<FatalFailure>,
    record_id: Option<RecordId>,
    document_url: Option<String>,
}

impl SagaReport {
    /// Report for a run rejected during validation; no steps were attempted.
    pub fn rejected(run_id: RunId, error: ValidationError) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            status: OverallStatus::Error,
            fatal: Some(FatalFailure::Validation(error)),
            record_id: None,
            document_url: None,
        }
    }

    /// Folds the attempted step outcomes, in execution order, into a report.
    pub fn aggregate(run_id: RunId, outcomes: Vec<StepOutcome>) -> Self {
        let record = outcomes
            .iter()
            .find(|o| o.step() == StepName::CreateRecord);

        let record_id = record
            .filter(|o| o.succeeded())
            .and_then(|o| o.artifact())
            .and_then(RecordId::from_json);

        let Some(record_id) = record_id else {
            return Self {
                run_id,
                fatal: Some(FatalFailure::RecordCreation {
                    detail: record.and_then(|o| o.detail()).map(str::to_string),
                }),
                outcomes,
                status: OverallStatus::Error,
                record_id: None,
                document_url: None,
            };
        };

        let document_url = outcomes
            .iter()
            .find(|o| o.step() == StepName::GenerateDocument)
            .and_then(|o| o.artifact())
            .and_then(Value::as_str)
            .map(str::to_string);

        let status = if outcomes.iter().all(StepOutcome::succeeded) {
            OverallStatus::Success
        } else {
            OverallStatus::Warning
        };

        Self {
            run_id,
            outcomes,
            status,
            fatal: None,
            record_id: Some(record_id),
            document_url,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Attempted step outcomes in execution order. Skipped steps are absent.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn status(&self) -> OverallStatus {
        self.status
    }

    pub fn fatal(&self) -> Option<&FatalFailure> {
        self.fatal.as_ref()
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref()
    }

    /// Public link to the generated document, if one was produced.
    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    /// Returns true if the given step was attempted.
    pub fn attempted(&self, step: StepName) -> bool {
        self.outcomes.iter().any(|o| o.step() == step)
    }

    /// Failed non-fatal steps, in execution order.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Human-readable explanation of the run.
    pub fn message(&self) -> String {
        message::compose(self)
    }
}
