//! Booking context, validation, and value objects.

mod context;
mod value_objects;

pub use context::{
    Booking, BookingContext, DEFAULT_RECORD_KIND, NotificationSummary, RecordInput,
    RequesterInput,
};
pub use value_objects::{Amount, DateRange, EmailAddress, PhoneNumber, Rounding, SubjectId};
