//! Caller-supplied booking context and its validated form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value_objects::{Amount, DateRange, EmailAddress, PhoneNumber, Rounding, SubjectId};
use crate::error::{FieldProblem, ProblemKind, ValidationError};

/// Record kind used when the caller does not name one.
pub const DEFAULT_RECORD_KIND: &str = "travel";

/// Identity and contact details of the requester, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequesterInput {
    /// Numeric identifier, as a JSON number or a numeric string.
    pub id: Option<Value>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The record being confirmed, as supplied by the caller.
///
/// Amounts are kept as raw JSON so that both numbers and numeric strings
/// can be accepted and reported precisely when malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub coverage_amount: Option<Value>,
    pub premium: Option<Value>,
    pub quantity: Option<Value>,
    pub destination: Option<String>,
}

/// Everything the confirmation saga needs, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingContext {
    #[serde(default)]
    pub requester: RequesterInput,
    #[serde(default)]
    pub record: RecordInput,
    /// Caller-chosen key forwarded to the record service for deduplication.
    pub idempotency_key: Option<String>,
}

/// A validated booking, ready to be confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub subject_id: SubjectId,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub kind: String,
    pub period: DateRange,
    pub coverage_amount: Amount,
    pub premium: Amount,
    pub quantity: u32,
    pub destination: Option<String>,
    pub idempotency_key: Option<String>,
}

/// Summary fields shared by the email and SMS notification payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    pub user_id: u64,
    pub policy_type: String,
    pub start_date: String,
    pub end_date: String,
    pub coverage_amount: u64,
    pub premium: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl BookingContext {
    /// Validates the context, collecting every problem found.
    pub fn validate(&self) -> Result<Booking, ValidationError> {
        let mut problems = Vec::new();
        let requester = &self.requester;
        let record = &self.record;

        let subject_id = check(
            &mut problems,
            "requester.id",
            required_value(&requester.id).and_then(SubjectId::from_json),
        );
        let email = check(
            &mut problems,
            "requester.email",
            required_str(&requester.email).and_then(EmailAddress::parse),
        );
        let phone = check(
            &mut problems,
            "requester.phone",
            required_str(&requester.phone).and_then(PhoneNumber::parse),
        );
        let start = check(
            &mut problems,
            "record.start_date",
            required_str(&record.start_date).and_then(DateRange::parse_date),
        );
        let end = check(
            &mut problems,
            "record.end_date",
            required_str(&record.end_date).and_then(DateRange::parse_date),
        );
        let coverage_amount = check(
            &mut problems,
            "record.coverage_amount",
            required_value(&record.coverage_amount)
                .and_then(|v| Amount::parse(v, Rounding::Exact)),
        );
        let premium = check(
            &mut problems,
            "record.premium",
            required_value(&record.premium).and_then(|v| Amount::parse(v, Rounding::Nearest)),
        );
        let quantity = check(
            &mut problems,
            "record.quantity",
            parse_quantity(record.quantity.as_ref()),
        );

        let period = match (start, end) {
            (Some(start), Some(end)) => {
                let range = DateRange::new(start, end);
                if range.is_none() {
                    problems.push(FieldProblem::new(
                        "record.end_date",
                        ProblemKind::Invalid("must not be before the start date".to_string()),
                    ));
                }
                range
            }
            _ => None,
        };

        match (
            subject_id,
            email,
            phone,
            period,
            coverage_amount,
            premium,
            quantity,
        ) {
            (
                Some(subject_id),
                Some(email),
                Some(phone),
                Some(period),
                Some(coverage_amount),
                Some(premium),
                Some(quantity),
            ) if problems.is_empty() => Ok(Booking {
                subject_id,
                email,
                phone,
                kind: non_blank(&record.kind)
                    .unwrap_or(DEFAULT_RECORD_KIND)
                    .to_string(),
                period,
                coverage_amount,
                premium,
                quantity,
                destination: non_blank(&record.destination).map(str::to_string),
                idempotency_key: non_blank(&self.idempotency_key).map(str::to_string),
            }),
            _ => Err(ValidationError { problems }),
        }
    }
}

impl Booking {
    /// Returns the summary fields carried by notification payloads.
    pub fn summary(&self) -> NotificationSummary {
        NotificationSummary {
            user_id: self.subject_id.as_u64(),
            policy_type: self.kind.clone(),
            start_date: self.period.start_str(),
            end_date: self.period.end_str(),
            coverage_amount: self.coverage_amount.units(),
            premium: self.premium.units(),
            destination: self.destination.clone(),
        }
    }
}

fn check<T>(
    problems: &mut Vec<FieldProblem>,
    field: &'static str,
    result: Result<T, ProblemKind>,
) -> Option<T> {
    result
        .map_err(|kind| problems.push(FieldProblem::new(field, kind)))
        .ok()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required_str(value: &Option<String>) -> Result<&str, ProblemKind> {
    non_blank(value).ok_or(ProblemKind::Missing)
}

fn required_value(value: &Option<Value>) -> Result<&Value, ProblemKind> {
    match value {
        None | Some(Value::Null) => Err(ProblemKind::Missing),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ProblemKind::Missing),
        Some(v) => Ok(v),
    }
}

fn parse_quantity(value: Option<&Value>) -> Result<u32, ProblemKind> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(1);
    };
    let amount = Amount::parse(value, Rounding::Exact)?;
    match u32::try_from(amount.units()) {
        Ok(0) => Err(ProblemKind::Invalid("must be at least 1".to_string())),
        Ok(quantity) => Ok(quantity),
        Err(_) => Err(ProblemKind::Invalid("is too large".to_string())),
    }
}
