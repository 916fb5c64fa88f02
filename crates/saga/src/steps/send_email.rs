//! Step 3: send the confirmation email.

use super::{ConfirmationStep, StepInput, StepName, notification_request};
use crate::config::StepSettings;
use crate::error::Result;
use crate::transport::StepRequest;

/// Sends the confirmation email through the email service.
#[derive(Debug, Clone)]
pub struct SendEmail {
    settings: StepSettings,
}

impl SendEmail {
    /// Creates the step with the given endpoint and timeout.
    pub fn new(settings: StepSettings) -> Self {
        Self { settings }
    }
}

impl ConfirmationStep for SendEmail {
    fn name(&self) -> StepName {
        StepName::SendEmail
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    fn required_field(&self) -> &'static str {
        "id"
    }

    fn build_request(&self, input: &StepInput<'_>) -> Result<StepRequest> {
        notification_request(
            input,
            self.name(),
            ("email", input.booking.email.as_str()),
        )
    }
}
