//! Session engine: the state synchronization core of the client.
//!
//! A [`WorkflowSession`] owns the [`RunStore`] and coordinates every path that
//! changes it:
//!
//! - **Editing** merges fields into the selected run locally and synchronously.
//! - **Saving** sends one step's local data and reconciles the returned run.
//! - **Automation** asks the backend to fill a step and reconciles the result,
//!   with at most one automation in flight per run.
//!
//! All paths converge on one rule: once a request succeeds, the backend's run
//! replaces the local copy of that run wholesale. Failures never roll local
//! state back; they are recorded in a single error slot (latest wins) and
//! returned to the caller.
//!
//! State lives behind a mutex that is never held across an `.await`, so
//! operations may overlap on a single-threaded executor exactly as UI
//! callbacks would.

use crate::backend::{CreateRunRequest, SaveStepRequest, SiteCredential, WorkflowBackend};
use crate::data::StepData;
use crate::error::{BackendError, Operation, SessionError};
use crate::run::WorkflowRun;
use crate::step::StepId;
use crate::store::{Reconciled, RunStore};
use deal_desk_core::RunId;
use rootcause::Report;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Result of a step automation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStepOutcome {
    /// The backend's run replaced the local copy.
    Applied,
    /// The run was no longer held locally, so the response was discarded.
    Dropped,
    /// Another step's automation is in flight for this run; nothing was sent.
    Busy { running: StepId },
}

impl From<Reconciled> for RunStepOutcome {
    fn from(r: Reconciled) -> Self {
        match r {
            Reconciled::Applied => Self::Applied,
            Reconciled::Dropped => Self::Dropped,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    store: RunStore,
    loading: bool,
    saving_step: Option<StepId>,
    running: HashMap<RunId, StepId>,
    last_error: Option<String>,
}

impl SessionState {
    fn reject(&mut self, error: SessionError) -> Report<SessionError> {
        warn!(error = %error, "rejected before sending");
        self.last_error = Some(error.to_string());
        error.into()
    }

    fn backend_failure(
        &mut self,
        operation: Operation,
        report: Report<BackendError>,
    ) -> Report<SessionError> {
        let message = report.current_context().to_string();
        warn!(%operation, error = %message, "backend request failed");
        self.last_error = Some(message);
        report.context(SessionError::Backend { operation })
    }
}

/// Clears a run's automation marker when dropped.
struct RunningGuard<'a> {
    state: &'a Mutex<SessionState>,
    run_id: RunId,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).running.remove(&self.run_id);
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validated(run: WorkflowRun) -> Result<WorkflowRun, Report<BackendError>> {
    run.validate().map_err(BackendError::InvalidRun)?;
    Ok(run)
}

/// Client-side view of all investigations and the operations on them.
pub struct WorkflowSession<B> {
    backend: B,
    state: Mutex<SessionState>,
}

impl<B: WorkflowBackend> WorkflowSession<B> {
    /// Creates a session with an empty store.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Returns the backend this session talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    /// Returns a snapshot of all runs in display order.
    #[must_use]
    pub fn runs(&self) -> Vec<WorkflowRun> {
        self.state().store.runs().to_vec()
    }

    /// Returns a snapshot of the selected run.
    #[must_use]
    pub fn selected_run(&self) -> Option<WorkflowRun> {
        self.state().store.selected().cloned()
    }

    /// Returns the selected run id.
    #[must_use]
    pub fn selected_id(&self) -> Option<RunId> {
        self.state().store.selected_id().cloned()
    }

    /// True while a list or create request is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// The step whose save is outstanding, if any. Advisory only.
    #[must_use]
    pub fn saving_step(&self) -> Option<StepId> {
        self.state().saving_step
    }

    /// The step whose automation is in flight for the selected run.
    #[must_use]
    pub fn running_step(&self) -> Option<StepId> {
        let state = self.state();
        let run_id = state.store.selected_id()?;
        state.running.get(run_id).copied()
    }

    /// The most recent surfaced error message.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Clears the surfaced error.
    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Loads the run list from the backend.
    ///
    /// Invalid runs in the listing are skipped. On failure the previous list
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn load_runs(&self) -> Result<usize, Report<SessionError>> {
        self.state().loading = true;
        let result = self.backend.list_runs().await;

        let mut state = self.state();
        state.loading = false;
        let runs = result.map_err(|report| state.backend_failure(Operation::ListRuns, report))?;

        let runs: Vec<WorkflowRun> = runs
            .into_iter()
            .filter(|run| match run.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(run_id = %run.id, error = %e, "skipping invalid run in listing");
                    false
                }
            })
            .collect();
        let count = runs.len();
        state.store.replace_all(runs);
        debug!(count, "loaded runs");
        Ok(count)
    }

    /// Creates a run on the backend, then prepends and selects it locally.
    ///
    /// The label and address are trimmed; a blank address is sent as null.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything if the label is
    /// blank, or a backend error if the request fails.
    pub async fn create_run(
        &self,
        label: &str,
        address: Option<&str>,
    ) -> Result<WorkflowRun, Report<SessionError>> {
        let label = label.trim();
        if label.is_empty() {
            return Err(self.state().reject(SessionError::Validation {
                reason: "label must not be empty".to_string(),
            }));
        }
        let request = CreateRunRequest {
            label: label.to_string(),
            address: address
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        };

        {
            let mut state = self.state();
            state.loading = true;
            state.last_error = None;
        }
        let result = self.backend.create_run(&request).await.and_then(validated);

        let mut state = self.state();
        state.loading = false;
        let run = result.map_err(|report| state.backend_failure(Operation::CreateRun, report))?;
        info!(run_id = %run.id, label = %run.label, "created run");
        state.store.insert_created(run.clone());
        Ok(run)
    }

    /// Selects a run. No network effect.
    pub fn select(&self, run_id: RunId) {
        self.state().store.select(run_id);
    }

    /// Merges one field into a step of the selected run. Local only.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSelection`] if no listed run is selected.
    pub fn edit_field(
        &self,
        step_id: StepId,
        field: &str,
        value: impl Into<JsonValue>,
    ) -> Result<(), Report<SessionError>> {
        let mut state = self.state();
        let Some(run_id) = state.store.selected().map(|r| r.id.clone()) else {
            return Err(state.reject(SessionError::NoSelection));
        };
        state.store.edit_field(&run_id, step_id, field, value);
        debug!(%run_id, %step_id, field, "edited step field");
        Ok(())
    }

    /// Returns the selected run's data for a step, empty when absent.
    #[must_use]
    pub fn step_data(&self, step_id: StepId) -> StepData {
        self.state()
            .store
            .selected()
            .map(|run| run.step_data(step_id))
            .unwrap_or_default()
    }

    /// True if the selected run's step has any structured key present.
    #[must_use]
    pub fn has_structured(&self, step_id: StepId) -> bool {
        self.step_data(step_id).has_structured(step_id)
    }

    /// Persists one step of the selected run and reconciles the response.
    ///
    /// The whole local data map for the step is sent, or `{}` if the step has
    /// no record. On success the entire run is replaced by the backend's copy,
    /// which discards unsaved edits to other steps of that run.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the request fails. Local
    /// state is unchanged on failure.
    pub async fn save_step(&self, step_id: StepId) -> Result<Reconciled, Report<SessionError>> {
        let (run_id, data) = {
            let mut state = self.state();
            let selected = state
                .store
                .selected()
                .map(|run| (run.id.clone(), run.step_data(step_id)));
            let Some(selected) = selected else {
                return Err(state.reject(SessionError::NoSelection));
            };
            state.saving_step = Some(step_id);
            selected
        };

        debug!(%run_id, %step_id, "saving step");
        let request = SaveStepRequest { data };
        let result = self
            .backend
            .save_step(&run_id, step_id, &request)
            .await
            .and_then(validated);

        let mut state = self.state();
        if state.saving_step == Some(step_id) {
            state.saving_step = None;
        }
        let run = result.map_err(|report| state.backend_failure(Operation::SaveStep, report))?;
        Ok(state.store.reconcile(run))
    }

    /// Triggers backend automation for one step of the selected run.
    ///
    /// At most one automation runs per run: while one is in flight, further
    /// calls for that run return [`RunStepOutcome::Busy`] without sending a
    /// request. The response replaces the whole run, including unsaved local
    /// edits to any of its steps.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the request fails. The
    /// in-flight marker is cleared on every path.
    pub async fn run_step(&self, step_id: StepId) -> Result<RunStepOutcome, Report<SessionError>> {
        let run_id = {
            let mut state = self.state();
            let Some(run_id) = state.store.selected().map(|r| r.id.clone()) else {
                return Err(state.reject(SessionError::NoSelection));
            };
            if let Some(&running) = state.running.get(&run_id) {
                debug!(%run_id, %step_id, %running, "automation already in flight");
                return Ok(RunStepOutcome::Busy { running });
            }
            state.running.insert(run_id.clone(), step_id);
            run_id
        };
        let _guard = RunningGuard {
            state: &self.state,
            run_id: run_id.clone(),
        };

        info!(%run_id, %step_id, "running step automation");
        let result = self
            .backend
            .run_step(&run_id, step_id)
            .await
            .and_then(validated);

        let mut state = self.state();
        let run = result.map_err(|report| state.backend_failure(Operation::RunStep, report))?;
        Ok(state.store.reconcile(run).into())
    }

    /// Re-fetches one run from the backend and reconciles it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh_run(&self, run_id: &RunId) -> Result<Reconciled, Report<SessionError>> {
        let result = self.backend.fetch_run(run_id).await.and_then(validated);

        let mut state = self.state();
        let run = result.map_err(|report| state.backend_failure(Operation::FetchRun, report))?;
        Ok(state.store.reconcile(run))
    }

    /// Stores credentials for an external research site on the backend.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any argument is blank, or a backend
    /// error if the request fails.
    pub async fn save_credentials(
        &self,
        site: &str,
        username: &str,
        password: &str,
    ) -> Result<(), Report<SessionError>> {
        if site.trim().is_empty() || username.is_empty() || password.is_empty() {
            return Err(self.state().reject(SessionError::Validation {
                reason: "site, username, and password are required".to_string(),
            }));
        }
        self.clear_error();
        let credential = SiteCredential {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result = self.backend.save_credentials(site.trim(), &credential).await;

        result.map_err(|report| {
            self.state()
                .backend_failure(Operation::SaveCredentials, report)
        })?;
        info!(site = site.trim(), "saved site credentials");
        Ok(())
    }
}
