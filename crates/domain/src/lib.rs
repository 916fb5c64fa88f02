//! Domain layer for the confirmation saga.
//!
//! This crate provides:
//! - `BookingContext`, the raw caller input for a confirmation
//! - Validation of that input into a well-formed `Booking`
//! - Value objects that hold the booking's invariants

pub mod booking;
pub mod error;

pub use booking::{
    Amount, Booking, BookingContext, DEFAULT_RECORD_KIND, DateRange, EmailAddress,
    NotificationSummary, PhoneNumber, RecordInput, RequesterInput, Rounding, SubjectId,
};
pub use error::{FieldProblem, ProblemKind, ValidationError};
