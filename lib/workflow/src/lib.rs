//! Workflow state synchronization engine for deal-desk.
//!
//! This crate models an investigation as a run of independently editable
//! steps and keeps a local copy of every run consistent with the backend:
//!
//! - **Step catalog**: the six fixed research steps and their static metadata
//! - **Step data**: open field maps with merge semantics and a typed
//!   structured extension for the assessor and registry steps
//! - **Run store**: the single in-memory copy of all runs and the selection
//! - **Backend seam**: the async trait the engine calls for persistence
//! - **Session**: local edits, step saves, and single-flight step automation

pub mod backend;
pub mod data;
pub mod error;
pub mod run;
pub mod session;
pub mod step;
pub mod store;

pub use backend::{CreateRunRequest, SaveStepRequest, SiteCredential, WorkflowBackend};
pub use data::{
    AssessorFields, EMPTY_VALUE, EntityRegistryFields, StepData, StructuredFields, display_value,
};
pub use error::{BackendError, Operation, RunValidationError, SessionError, ShapeError};
pub use run::{StepRecord, WorkflowRun};
pub use session::{RunStepOutcome, WorkflowSession};
pub use step::{NOTES_FIELD, StepDefinition, StepId, StructuredField, UnknownStepError, catalog};
pub use store::{Reconciled, RunStore};
