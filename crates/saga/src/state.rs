//! Saga state machine.

use serde::{Deserialize, Serialize};

use crate::steps::StepName;

/// The state of a confirmation run.
///
/// State transitions:
/// ```text
/// Validating ──► CreatingRecord ──► GeneratingDocument ──► SendingEmail ──► SendingSms ──► Finalized
///     │                │                                                                     ▲
///     └────────────────┴─────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// The booking context is being checked.
    #[default]
    Validating,

    /// Step 1 is running.
    CreatingRecord,

    /// Step 2 is running.
    GeneratingDocument,

    /// Step 3 is running.
    SendingEmail,

    /// Step 4 is running.
    SendingSms,

    /// The report has been built (terminal state).
    Finalized,
}

impl SagaState {
    /// Returns the state in which the given step runs.
    pub fn running(step: StepName) -> Self {
        match step {
            StepName::CreateRecord => SagaState::CreatingRecord,
            StepName::GenerateDocument => SagaState::GeneratingDocument,
            StepName::SendEmail => SagaState::SendingEmail,
            StepName::SendSms => SagaState::SendingSms,
        }
    }

    /// Returns true if the machine may move from this state to `next`.
    pub fn can_transition_to(&self, next: SagaState) -> bool {
        use SagaState::*;
        matches!(
            (self, next),
            (Validating, CreatingRecord)
                | (Validating, Finalized)
                | (CreatingRecord, GeneratingDocument)
                | (CreatingRecord, Finalized)
                | (GeneratingDocument, SendingEmail)
                | (SendingEmail, SendingSms)
                | (SendingSms, Finalized)
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Validating => "Validating",
            SagaState::CreatingRecord => "CreatingRecord",
            SagaState::GeneratingDocument => "GeneratingDocument",
            SagaState::SendingEmail => "SendingEmail",
            SagaState::SendingSms => "SendingSms",
            SagaState::Finalized => "Finalized",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
