//! Step 4: send the confirmation SMS.

use super::{ConfirmationStep, StepInput, StepName, notification_request};
use crate::config::StepSettings;
use crate::error::Result;
use crate::transport::StepRequest;

/// Sends the confirmation SMS through the SMS service.
#[derive(Debug, Clone)]
pub struct SendSms {
    settings: StepSettings,
}

impl SendSms {
    /// Creates the step with the given endpoint and timeout.
    pub fn new(settings: StepSettings) -> Self {
        Self { settings }
    }
}

impl ConfirmationStep for SendSms {
    fn name(&self) -> StepName {
        StepName::SendSms
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    // Twilio message SID.
    fn required_field(&self) -> &'static str {
        "sid"
    }

    fn build_request(&self, input: &StepInput<'_>) -> Result<StepRequest> {
        notification_request(
            input,
            self.name(),
            ("phone", input.booking.phone.as_str()),
        )
    }
}
