//! Backend capability consumed by the session engine.
//!
//! The engine never speaks HTTP itself. It calls into an implementation of
//! [`WorkflowBackend`], which lets the engine be exercised against an
//! in-memory double while the gateway crate provides the real client.

use crate::data::StepData;
use crate::error::BackendError;
use crate::run::WorkflowRun;
use crate::step::StepId;
use async_trait::async_trait;
use deal_desk_core::{Result, RunId};
use serde::{Deserialize, Serialize};

/// Body of a run creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRunRequest {
    /// Trimmed, non-empty label.
    pub label: String,
    /// Trimmed address, or `None` when blank.
    pub address: Option<String>,
}

/// Body of a step save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStepRequest {
    /// The step's complete local data map.
    pub data: StepData,
}

/// Credentials for an external research site.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCredential {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SiteCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Operations the backend exposes to the workflow engine.
///
/// Every run-returning operation yields the complete, authoritative run.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Lists all runs.
    async fn list_runs(&self) -> Result<Vec<WorkflowRun>, BackendError>;

    /// Creates a run; the backend assigns id, timestamps, and status.
    async fn create_run(
        &self,
        request: &CreateRunRequest,
    ) -> Result<WorkflowRun, BackendError>;

    /// Fetches a single run.
    async fn fetch_run(&self, run_id: &RunId) -> Result<WorkflowRun, BackendError>;

    /// Replaces one step's data and returns the updated run.
    async fn save_step(
        &self,
        run_id: &RunId,
        step_id: StepId,
        request: &SaveStepRequest,
    ) -> Result<WorkflowRun, BackendError>;

    /// Runs the automation for one step and returns the updated run.
    async fn run_step(
        &self,
        run_id: &RunId,
        step_id: StepId,
    ) -> Result<WorkflowRun, BackendError>;

    /// Stores credentials for an external site.
    async fn save_credentials(
        &self,
        site: &str,
        credential: &SiteCredential,
    ) -> Result<(), BackendError>;
}
