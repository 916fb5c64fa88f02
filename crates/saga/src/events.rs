//! Progress events emitted while a saga runs.

use serde::{Deserialize, Serialize};

use crate::outcome::OverallStatus;
use crate::state::SagaState;
use crate::steps::StepName;

/// An observable state transition of a running saga.
///
/// Presentation layers render these as interim status; they carry no saga
/// logic of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaProgress {
    /// The booking context is being validated.
    Validating,

    /// A step is about to be attempted.
    StepStarted { step: StepName },

    /// A step finished.
    StepFinished { step: StepName, succeeded: bool },

    /// The run reached its verdict.
    Finalized { status: OverallStatus },
}

impl SagaProgress {
    /// Returns the event name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaProgress::Validating => "Validating",
            SagaProgress::StepStarted { .. } => "StepStarted",
            SagaProgress::StepFinished { .. } => "StepFinished",
            SagaProgress::Finalized { .. } => "Finalized",
        }
    }

    /// Returns the saga state this event reports.
    pub fn state(&self) -> SagaState {
        match self {
            SagaProgress::Validating => SagaState::Validating,
            SagaProgress::StepStarted { step } | SagaProgress::StepFinished { step, .. } => {
                SagaState::running(*step)
            }
            SagaProgress::Finalized { .. } => SagaState::Finalized,
        }
    }

    /// Short interim status line for display.
    pub fn status_line(&self) -> String {
        match self {
            SagaProgress::Validating => "Checking booking details...".to_string(),
            SagaProgress::StepStarted { step } => match step {
                StepName::CreateRecord => "Creating record...".to_string(),
                StepName::GenerateDocument => "Generating document...".to_string(),
                StepName::SendEmail => "Sending confirmation email...".to_string(),
                StepName::SendSms => "Sending confirmation SMS...".to_string(),
            },
            SagaProgress::StepFinished { step, succeeded: true } => format!("{step} done"),
            SagaProgress::StepFinished { step, succeeded: false } => {
                step.failure_clause().to_string()
            }
            SagaProgress::Finalized { status } => format!("Finished with {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        assert_eq!(SagaProgress::Validating.event_type(), "Validating");
        assert_eq!(
            SagaProgress::StepStarted {
                step: StepName::SendSms
            }
            .event_type(),
            "StepStarted"
        );
    }

    #[test]
    fn test_state_mapping() {
        let finished = SagaProgress::StepFinished {
            step: StepName::GenerateDocument,
            succeeded: false,
        };
        assert_eq!(finished.state(), SagaState::GeneratingDocument);
        assert_eq!(finished.status_line(), "document generation failed");
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = SagaProgress::StepFinished {
            step: StepName::SendEmail,
            succeeded: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StepFinished");
        assert_eq!(json["data"]["step"], "send_email");
        assert_eq!(json["data"]["succeeded"], true);

        let back: SagaProgress = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
