//! Value objects for the booking domain.
//!
//! Each type can only be constructed through a parser that enforces its
//! invariant, so a `Booking` built from them is well-formed by construction.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProblemKind;

/// Identifier of the requester on whose behalf the record is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(u64);

impl SubjectId {
    /// Parses a subject ID from a decimal string.
    pub fn parse(raw: &str) -> Result<Self, ProblemKind> {
        raw.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ProblemKind::Invalid("must be a non-negative integer".to_string()))
    }

    /// Parses a subject ID from a JSON number or numeric string.
    pub fn from_json(value: &Value) -> Result<Self, ProblemKind> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n.as_u64().map(Self).ok_or_else(|| {
                ProblemKind::Invalid("must be a non-negative integer".to_string())
            }),
            _ => Err(ProblemKind::Invalid("must be a number".to_string())),
        }
    }

    /// Returns the underlying integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address.
    ///
    /// Requires exactly one `@`, a non-empty local part, and a domain with
    /// a dot that neither starts nor ends the domain.
    pub fn parse(raw: &str) -> Result<Self, ProblemKind> {
        let raw = raw.trim();
        let invalid = || ProblemKind::Invalid("not a valid email address".to_string());

        if raw.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = raw.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phone number suitable for SMS delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    /// Parses a phone number.
    ///
    /// Accepts an optional leading `+` followed by digits, spaces, dashes,
    /// and parentheses, with 7 to 15 digits in total. The original spelling
    /// is kept since the SMS service does its own normalization.
    pub fn parse(raw: &str) -> Result<Self, ProblemKind> {
        let raw = raw.trim();
        let body = raw.strip_prefix('+').unwrap_or(raw);

        let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')');
        if body.is_empty() || !body.chars().all(allowed) {
            return Err(ProblemKind::Invalid(
                "may only contain digits, spaces, dashes, and parentheses".to_string(),
            ));
        }

        let digits = body.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(ProblemKind::Invalid(format!(
                "must have between {} and {} digits",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive calendar date range covered by the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Wire format for dates, both inbound and outbound.
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Creates a range, returning `None` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Parses a single `YYYY-MM-DD` date.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, ProblemKind> {
        NaiveDate::parse_from_str(raw.trim(), Self::FORMAT)
            .map_err(|_| ProblemKind::Invalid("not a valid YYYY-MM-DD date".to_string()))
    }

    /// Returns the first day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Formats the start date in wire format.
    pub fn start_str(&self) -> String {
        self.start.format(Self::FORMAT).to_string()
    }

    /// Formats the end date in wire format.
    pub fn end_str(&self) -> String {
        self.end.format(Self::FORMAT).to_string()
    }

    /// Formats the range for humans, e.g. `Jan 5, 2025 to Jan 12, 2025`.
    pub fn display(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%b %-d, %Y"),
            self.end.format("%b %-d, %Y")
        )
    }
}

/// How fractional input is treated when parsing an [`Amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Fractional values are rejected.
    Exact,
    /// Fractional values are rounded to the nearest whole unit.
    Nearest,
}

/// A non-negative whole monetary amount in the record's currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Returns the amount in whole units.
    pub fn units(&self) -> u64 {
        self.0
    }

    /// Parses an amount from a JSON number or a numeric string.
    pub fn parse(value: &Value, rounding: Rounding) -> Result<Self, ProblemKind> {
        let number = match value {
            Value::Number(n) => {
                if let Some(units) = n.as_u64() {
                    return Ok(Self(units));
                }
                n.as_f64()
            }
            Value::String(s) => {
                let s = s.trim();
                if let Ok(units) = s.parse::<u64>() {
                    return Ok(Self(units));
                }
                s.parse::<f64>().ok()
            }
            _ => None,
        };

        let number = number
            .filter(|n| n.is_finite())
            .ok_or_else(|| ProblemKind::Invalid("must be a number".to_string()))?;
        if number < 0.0 {
            return Err(ProblemKind::Invalid("must not be negative".to_string()));
        }
        if number.fract() != 0.0 && rounding == Rounding::Exact {
            return Err(ProblemKind::Invalid("must be a whole number".to_string()));
        }
        if number.round() > u64::MAX as f64 {
            return Err(ProblemKind::Invalid("is too large".to_string()));
        }
        Ok(Self(number.round() as u64))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_subject_id_parse() {
        assert_eq!(SubjectId::parse(" 42 ").unwrap().as_u64(), 42);
        assert!(SubjectId::parse("-1").is_err());
        assert!(SubjectId::parse("abc").is_err());
    }

    #[test]
    fn test_email_parse() {
        assert!(EmailAddress::parse("ana@example.com").is_ok());
        assert!(EmailAddress::parse("ana@example").is_err());
        assert!(EmailAddress::parse("@example.com").is_err());
        assert!(EmailAddress::parse("ana@@example.com").is_err());
        assert!(EmailAddress::parse("ana @example.com").is_err());
        assert!(EmailAddress::parse("ana@.com").is_err());
    }

    #[test]
    fn test_phone_parse() {
        assert!(PhoneNumber::parse("+1 (555) 123-4567").is_ok());
        assert!(PhoneNumber::parse("9876543210").is_ok());
        assert!(PhoneNumber::parse("12345").is_err());
        assert!(PhoneNumber::parse("555-CALL-NOW").is_err());
        assert!(PhoneNumber::parse("+").is_err());
    }

    #[test]
    fn test_date_range_rejects_inverted_range() {
        assert!(DateRange::new(date(2025, 1, 10), date(2025, 1, 5)).is_none());
        let single = DateRange::new(date(2025, 1, 5), date(2025, 1, 5)).unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_date_range_from_wire_dates_keeps_order() {
        let late = DateRange::parse_date("2025-01-12").unwrap();
        let early = DateRange::parse_date("2025-01-05").unwrap();
        assert!(DateRange::new(late, early).is_none());

        let range = DateRange::new(early, late).unwrap();
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            json!({"start": "2025-01-05", "end": "2025-01-12"})
        );
    }

    #[test]
    fn test_date_parse_rejects_impossible_dates() {
        assert!(DateRange::parse_date("2025-02-30").is_err());
        assert!(DateRange::parse_date("05/01/2025").is_err());
        assert_eq!(DateRange::parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_date_range_display() {
        let range = DateRange::new(date(2025, 1, 5), date(2025, 1, 12)).unwrap();
        assert_eq!(range.display(), "Jan 5, 2025 to Jan 12, 2025");
        assert_eq!(range.start_str(), "2025-01-05");
        assert_eq!(range.end_str(), "2025-01-12");
    }

    #[test]
    fn test_amount_parse_exact() {
        assert_eq!(Amount::parse(&json!(5000), Rounding::Exact).unwrap().units(), 5000);
        assert_eq!(Amount::parse(&json!("750"), Rounding::Exact).unwrap().units(), 750);
        assert_eq!(Amount::parse(&json!(12.0), Rounding::Exact).unwrap().units(), 12);
        assert!(Amount::parse(&json!(12.5), Rounding::Exact).is_err());
        assert!(Amount::parse(&json!(-3), Rounding::Exact).is_err());
        assert!(Amount::parse(&json!("lots"), Rounding::Exact).is_err());
        assert!(Amount::parse(&json!(true), Rounding::Exact).is_err());
    }

    #[test]
    fn test_amount_parse_rounds_to_nearest() {
        assert_eq!(Amount::parse(&json!(49.5), Rounding::Nearest).unwrap().units(), 50);
        assert_eq!(Amount::parse(&json!("49.4"), Rounding::Nearest).unwrap().units(), 49);
        assert!(Amount::parse(&json!(-0.5), Rounding::Nearest).is_err());
    }
}
