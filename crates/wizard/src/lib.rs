//! Runtime for the account signup wizard.
//!
//! Wraps the pure reducer and schemas from `signup-core` with a persisted
//! draft store, rehydration, the in-flight submission flag and the client
//! for the remote submission endpoint.

pub mod config;
pub mod error;
pub mod machine;
pub mod persist;
pub mod store;
pub mod submission;

pub use config::WizardConfig;
pub use error::{FailureCategory, SubmissionError, WizardError};
pub use machine::{StepOutcome, WizardMachine};
pub use store::{DraftStore, FileDraftStore, MemoryDraftStore, StoreError};
pub use submission::{HttpSubmissionClient, SubmissionClient, SubmittedAccount};
