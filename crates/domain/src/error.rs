//! Domain error types.

use thiserror::Error;

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemKind {
    /// The field was absent or blank.
    #[error("is missing")]
    Missing,

    /// The field was present but malformed.
    #[error("is invalid: {0}")]
    Invalid(String),
}

/// A problem with one field of a booking context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {kind}")]
pub struct FieldProblem {
    /// Dotted path of the offending field, e.g. `requester.phone`.
    pub field: &'static str,
    /// What is wrong with it.
    pub kind: ProblemKind,
}

impl FieldProblem {
    /// Creates a problem for the given field.
    pub fn new(field: &'static str, kind: ProblemKind) -> Self {
        Self { field, kind }
    }

    /// Returns true if the field was missing rather than malformed.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ProblemKind::Missing)
    }
}

/// A booking context that failed validation.
///
/// Carries every problem found, in field order, not only the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing or invalid booking details: {}", join_problems(.problems))]
pub struct ValidationError {
    pub problems: Vec<FieldProblem>,
}

impl ValidationError {
    /// Returns true if the given field has a problem.
    pub fn has_problem(&self, field: &str) -> bool {
        self.problems.iter().any(|p| p.field == field)
    }
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = ValidationError {
            problems: vec![
                FieldProblem::new("requester.phone", ProblemKind::Missing),
                FieldProblem::new(
                    "record.premium",
                    ProblemKind::Invalid("must not be negative".to_string()),
                ),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Missing or invalid booking details: requester.phone is missing; \
             record.premium is invalid: must not be negative"
        );
        assert!(err.has_problem("requester.phone"));
        assert!(!err.has_problem("requester.email"));
    }
}
