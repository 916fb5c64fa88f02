//! The step contract and the four confirmation steps.
//!
//! Every step is executed the same way: build a request from the booking
//! and earlier outcomes, post it with the step's timeout, and classify the
//! response. Steps differ only in payload, required response field, and
//! what they keep as an artifact.

pub mod create_record;
pub mod generate_document;
pub mod send_email;
pub mod send_sms;

pub use create_record::CreateRecord;
pub use generate_document::GenerateDocument;
pub use send_email::SendEmail;
pub use send_sms::SendSms;

use async_trait::async_trait;
use common::{RecordId, RunId};
use domain::Booking;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StepSettings;
use crate::error::{Result, SagaError};
use crate::outcome::StepOutcome;
use crate::transport::{StepRequest, StepTransport, TransportResponse};

/// Names of the confirmation steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    CreateRecord,
    GenerateDocument,
    SendEmail,
    SendSms,
}

impl StepName {
    /// All steps in execution order.
    pub const ALL: [StepName; 4] = [
        StepName::CreateRecord,
        StepName::GenerateDocument,
        StepName::SendEmail,
        StepName::SendSms,
    ];

    /// Returns true if failing this step aborts the rest of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StepName::CreateRecord)
    }

    /// Short clause describing this step's failure.
    pub fn failure_clause(&self) -> &'static str {
        match self {
            StepName::CreateRecord => "record creation failed",
            StepName::GenerateDocument => "document generation failed",
            StepName::SendEmail => "email sending failed",
            StepName::SendSms => "SMS sending failed",
        }
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::CreateRecord => "create_record",
            StepName::GenerateDocument => "generate_document",
            StepName::SendEmail => "send_email",
            StepName::SendSms => "send_sms",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a step sees when it runs.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub run_id: RunId,
    pub booking: &'a Booking,
    /// Outcomes of the steps already attempted in this run, in order.
    pub prior: &'a [StepOutcome],
}

impl StepInput<'_> {
    /// Returns the record identifier produced by a successful record step.
    pub fn record_id(&self) -> Option<RecordId> {
        self.prior
            .iter()
            .find(|o| o.step() == StepName::CreateRecord && o.succeeded())
            .and_then(|o| o.artifact())
            .and_then(RecordId::from_json)
    }

    /// Like [`record_id`](Self::record_id), but an error for steps that need it.
    pub fn require_record_id(&self, step: StepName) -> Result<RecordId> {
        self.record_id().ok_or(SagaError::MissingPriorArtifact {
            step,
            needs: "a record identifier",
        })
    }
}

/// Builds the body shared by the email and SMS steps.
///
/// `contact` is the recipient field name and value, e.g. `("email", ...)`.
pub(crate) fn notification_request(
    input: &StepInput<'_>,
    step: StepName,
    contact: (&str, &str),
) -> Result<StepRequest> {
    let record_id = input.require_record_id(step)?;
    let mut body = serde_json::to_value(input.booking.summary())?;
    if let Value::Object(fields) = &mut body {
        fields.insert(contact.0.to_string(), Value::String(contact.1.to_string()));
        fields.insert("policyId".to_string(), record_id.to_json());
    }
    Ok(StepRequest::new(body))
}

/// A unit of work in the confirmation saga.
#[async_trait]
pub trait ConfirmationStep: Send + Sync {
    /// The step's name.
    fn name(&self) -> StepName;

    /// Endpoint and timeout.
    fn settings(&self) -> &StepSettings;

    /// Response field whose presence signals success.
    fn required_field(&self) -> &'static str;

    /// Builds the request payload. Must not mutate anything.
    fn build_request(&self, input: &StepInput<'_>) -> Result<StepRequest>;

    /// Turns the required field's value into the stored artifact.
    ///
    /// By default any non-blank scalar is kept exactly as returned.
    fn artifact_from(&self, value: &Value) -> Option<Value> {
        RecordId::from_json(value).map(|_| value.clone())
    }

    /// Whether an artifact found in a failed response is still kept.
    fn keeps_artifact_on_failure(&self) -> bool {
        false
    }

    /// Classifies a response: success iff 2xx and the required field is present.
    fn classify(&self, response: &TransportResponse) -> StepOutcome {
        let artifact = response
            .field(self.required_field())
            .and_then(|value| self.artifact_from(value));

        match artifact {
            Some(artifact) if response.is_success() => {
                StepOutcome::success(self.name(), Some(artifact))
            }
            artifact => {
                let detail = if response.is_success() {
                    response.reported_detail().unwrap_or_else(|| {
                        format!(
                            "Status {}, but the response had no {}.",
                            response.status,
                            self.required_field()
                        )
                    })
                } else {
                    response.failure_detail()
                };
                let salvaged = artifact.filter(|_| self.keeps_artifact_on_failure());
                StepOutcome::failed(self.name(), detail, salvaged)
            }
        }
    }

    /// Runs the step once and returns its outcome. Never fails.
    async fn execute(&self, input: &StepInput<'_>, transport: &dyn StepTransport) -> StepOutcome {
        let request = match self.build_request(input) {
            Ok(request) => request,
            Err(e) => return StepOutcome::failed(self.name(), e.to_string(), None),
        };

        let settings = self.settings();
        let call = transport.post_json(&settings.endpoint, &request);
        match tokio::time::timeout(settings.timeout, call).await {
            Ok(Ok(response)) => self.classify(&response),
            Ok(Err(e)) => StepOutcome::failed(self.name(), SagaError::from(e).to_string(), None),
            Err(_) => StepOutcome::failed(
                self.name(),
                SagaError::Timeout {
                    after: settings.timeout,
                }
                .to_string(),
                None,
            ),
        }
    }
}
