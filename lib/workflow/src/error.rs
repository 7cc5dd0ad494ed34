//! Error types for the workflow crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ShapeError` / `RunValidationError`: a backend run failed ingestion checks
//! - `BackendError`: a backend request failed (transport, status, or decoding)
//! - `SessionError`: high-level session operations (wraps lower errors via context)

use crate::step::StepId;
use deal_desk_core::RunId;
use std::fmt;

/// A structured key holds a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    /// Step whose data failed the check.
    pub step_id: StepId,
    /// Offending key.
    pub field: String,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "structured field '{}' of step {} has an unsupported shape",
            self.field, self.step_id
        )
    }
}

impl std::error::Error for ShapeError {}

/// Errors from validating a run received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunValidationError {
    /// The run label is empty.
    EmptyLabel { run_id: RunId },
    /// The same step appears more than once.
    DuplicateStep { run_id: RunId, step_id: StepId },
    /// A structured value has the wrong shape.
    Shape { run_id: RunId, source: ShapeError },
}

impl fmt::Display for RunValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLabel { run_id } => write!(f, "run {run_id} has an empty label"),
            Self::DuplicateStep { run_id, step_id } => {
                write!(f, "run {run_id} contains step {step_id} more than once")
            }
            Self::Shape { run_id, source } => write!(f, "run {run_id}: {source}"),
        }
    }
}

impl std::error::Error for RunValidationError {}

/// Errors from backend requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request could not be built from the configured base URL.
    InvalidEndpoint { reason: String },
    /// The request never produced a response.
    Transport { reason: String },
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    Decode { reason: String },
    /// The response decoded but failed validation.
    InvalidRun(RunValidationError),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint { reason } => write!(f, "invalid backend endpoint: {reason}"),
            Self::Transport { reason } => write!(f, "request failed: {reason}"),
            Self::Status { status, body } => write!(f, "request failed ({status}): {body}"),
            Self::Decode { reason } => write!(f, "invalid response body: {reason}"),
            Self::InvalidRun(e) => write!(f, "invalid run in response: {e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<RunValidationError> for BackendError {
    fn from(e: RunValidationError) -> Self {
        Self::InvalidRun(e)
    }
}

/// The session operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRuns,
    CreateRun,
    FetchRun,
    SaveStep,
    RunStep,
    SaveCredentials,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListRuns => "list runs",
            Self::CreateRun => "create run",
            Self::FetchRun => "fetch run",
            Self::SaveStep => "save step",
            Self::RunStep => "run step",
            Self::SaveCredentials => "save credentials",
        })
    }
}

/// High-level session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Input was rejected before any request was issued.
    Validation { reason: String },
    /// The operation needs a selected run and none is selected.
    NoSelection,
    /// A backend request failed (use as context wrapper).
    Backend { operation: Operation },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { reason } => write!(f, "{reason}"),
            Self::NoSelection => write!(f, "no investigation selected"),
            Self::Backend { operation } => write!(f, "failed to {operation}"),
        }
    }
}

impl std::error::Error for SessionError {}
