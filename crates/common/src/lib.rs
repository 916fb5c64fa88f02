//! Shared identifier types for the confirmation saga.

mod types;

pub use types::{RecordId, RunId};
