//! Step 2: generate the confirmation document.

use serde_json::{Value, json};

use super::{ConfirmationStep, StepInput, StepName};
use crate::config::StepSettings;
use crate::error::Result;
use crate::link::LinkNormalizer;
use crate::transport::StepRequest;

/// Asks the document service for a document and keeps its public link.
#[derive(Debug, Clone)]
pub struct GenerateDocument {
    settings: StepSettings,
    document_kind: String,
    links: LinkNormalizer,
}

impl GenerateDocument {
    /// Creates the step.
    pub fn new(
        settings: StepSettings,
        document_kind: impl Into<String>,
        links: LinkNormalizer,
    ) -> Self {
        Self {
            settings,
            document_kind: document_kind.into(),
            links,
        }
    }
}

impl ConfirmationStep for GenerateDocument {
    fn name(&self) -> StepName {
        StepName::GenerateDocument
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    fn required_field(&self) -> &'static str {
        "document_url"
    }

    fn build_request(&self, input: &StepInput<'_>) -> Result<StepRequest> {
        let record_id = input.require_record_id(self.name())?;
        Ok(StepRequest::new(json!({
            "policy_id": record_id.to_json(),
            "document_type": self.document_kind,
        })))
    }

    fn artifact_from(&self, value: &Value) -> Option<Value> {
        self.links.normalize(value.as_str()).map(Value::String)
    }

    // A failed response may still carry a usable link.
    fn keeps_artifact_on_failure(&self) -> bool {
        true
    }
}
