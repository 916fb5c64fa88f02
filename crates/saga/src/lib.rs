//! Post-purchase confirmation saga.
//!
//! After a purchase is committed, the confirmation saga runs four dependent
//! calls against independent services:
//! 1. Create the record (fatal on failure)
//! 2. Generate the confirmation document
//! 3. Send the confirmation email
//! 4. Send the confirmation SMS
//!
//! Steps 2-4 run whenever step 1 succeeds, even if one of them fails. The
//! run ends in a single `Success`, `Warning`, or `Error` report, and a
//! follow-up transition can be scheduled from it. Nothing is retried or
//! compensated, and no saga state is persisted.

pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod link;
pub mod message;
pub mod outcome;
pub mod scheduler;
pub mod state;
pub mod steps;
pub mod transport;

pub use config::{FollowUpSettings, LinkSettings, SagaConfig, StepSettings};
pub use context::CallerContext;
pub use coordinator::SagaCoordinator;
pub use error::{SagaError, TransportError};
pub use events::SagaProgress;
pub use link::LinkNormalizer;
pub use outcome::{FatalFailure, OverallStatus, SagaReport, StepOutcome};
pub use scheduler::{CompletionScheduler, FollowUp, ScheduledFollowUp};
pub use state::SagaState;
pub use steps::{ConfirmationStep, StepInput, StepName};
pub use transport::{
    HttpTransport, InMemoryTransport, RecordedCall, StepRequest, StepTransport, TransportResponse,
};
