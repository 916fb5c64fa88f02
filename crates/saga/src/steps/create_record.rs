//! Step 1: create the record being confirmed.

use serde_json::json;

use super::{ConfirmationStep, StepInput, StepName};
use crate::config::StepSettings;
use crate::error::Result;
use crate::transport::StepRequest;

/// Header carrying the deduplication key for record creation.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Creates the record on the record service.
///
/// The only fatal step: nothing else runs unless it succeeds.
#[derive(Debug, Clone)]
pub struct CreateRecord {
    settings: StepSettings,
}

impl CreateRecord {
    /// Creates the step with the given endpoint and timeout.
    pub fn new(settings: StepSettings) -> Self {
        Self { settings }
    }
}

impl ConfirmationStep for CreateRecord {
    fn name(&self) -> StepName {
        StepName::CreateRecord
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    fn required_field(&self) -> &'static str {
        "id"
    }

    fn build_request(&self, input: &StepInput<'_>) -> Result<StepRequest> {
        let booking = input.booking;
        let body = json!({
            "user_id": booking.subject_id.as_u64(),
            "policy_type": booking.kind,
            "start_date": booking.period.start_str(),
            "end_date": booking.period.end_str(),
            "coverage_amount": booking.coverage_amount.units(),
            "premium": booking.premium.units(),
            "quantity": booking.quantity,
        });

        let key = booking
            .idempotency_key
            .clone()
            .unwrap_or_else(|| input.run_id.to_string());
        Ok(StepRequest::new(body).with_header(IDEMPOTENCY_KEY_HEADER, key))
    }
}
