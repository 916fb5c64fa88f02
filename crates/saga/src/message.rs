//! Composes the human-readable message for a saga report.
//!
//! Kept apart from aggregation so the report itself stays structured.

use crate::outcome::{FatalFailure, OverallStatus, SagaReport, StepOutcome};

/// Builds the message shown to the requester for a finished run.
pub fn compose(report: &SagaReport) -> String {
    match (report.status(), report.record_id()) {
        (OverallStatus::Success, Some(record_id)) => format!(
            "Record {record_id} confirmed: document generated, email and SMS sent."
        ),
        (OverallStatus::Warning, Some(record_id)) => {
            let clauses: Vec<String> = report.failed_steps().map(failure_clause).collect();
            format!("Record {record_id} created, but {}.", clauses.join("; "))
        }
        _ => fatal_message(report.fatal()),
    }
}

fn fatal_message(fatal: Option<&FatalFailure>) -> String {
    match fatal {
        Some(FatalFailure::Validation(error)) => format!("{error}."),
        Some(FatalFailure::RecordCreation {
            detail: Some(detail),
        }) => format!("Failed to create record: {}.", trim_detail(detail)),
        Some(FatalFailure::RecordCreation { detail: None }) | None => {
            "Failed to create record.".to_string()
        }
    }
}

fn failure_clause(outcome: &StepOutcome) -> String {
    let clause = outcome.step().failure_clause();
    match outcome.detail().map(trim_detail).filter(|d| !d.is_empty()) {
        Some(detail) => format!("{clause} ({detail})"),
        None => clause.to_string(),
    }
}

fn trim_detail(detail: &str) -> &str {
    detail.trim().trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepName;
    use common::RunId;
    use domain::{FieldProblem, ProblemKind, ValidationError};
    use serde_json::json;

    fn record_ok() -> StepOutcome {
        StepOutcome::success(StepName::CreateRecord, Some(json!("17")))
    }

    #[test]
    fn test_success_message_names_record() {
        let report = SagaReport::aggregate(
            RunId::new(),
            vec![
                record_ok(),
                StepOutcome::success(StepName::GenerateDocument, Some(json!("u"))),
                StepOutcome::success(StepName::SendEmail, Some(json!("m"))),
                StepOutcome::success(StepName::SendSms, Some(json!("s"))),
            ],
        );
        assert_eq!(
            compose(&report),
            "Record 17 confirmed: document generated, email and SMS sent."
        );
    }

    #[test]
    fn test_warning_message_lists_failures_in_order() {
        let report = SagaReport::aggregate(
            RunId::new(),
            vec![
                record_ok(),
                StepOutcome::failed(StepName::GenerateDocument, "Status 500.", None),
                StepOutcome::success(StepName::SendEmail, Some(json!("m"))),
                StepOutcome::failed(
                    StepName::SendSms,
                    "Service unavailable: connection refused",
                    None,
                ),
            ],
        );
        assert_eq!(
            compose(&report),
            "Record 17 created, but document generation failed (Status 500); \
             SMS sending failed (Service unavailable: connection refused)."
        );
    }

    #[test]
    fn test_record_failure_message_uses_detail() {
        let report = SagaReport::aggregate(
            RunId::new(),
            vec![StepOutcome::failed(
                StepName::CreateRecord,
                "Coverage exceeds plan limit",
                None,
            )],
        );
        assert_eq!(
            compose(&report),
            "Failed to create record: Coverage exceeds plan limit."
        );
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let report = SagaReport::rejected(
            RunId::new(),
            ValidationError {
                problems: vec![FieldProblem::new("requester.phone", ProblemKind::Missing)],
            },
        );
        assert_eq!(
            compose(&report),
            "Missing or invalid booking details: requester.phone is missing."
        );
    }
}
