pub mod confirmations;
pub mod observability;
