//! In-memory store of workflow runs.
//!
//! The store is the single in-memory copy of every known run plus the current
//! selection. It is mutated through a small set of entry points only: bulk
//! replacement after a list, insertion after a create, selection, local field
//! edits, and whole-run reconciliation after a backend response.

use crate::run::WorkflowRun;
use crate::step::StepId;
use deal_desk_core::RunId;
use serde_json::Value as JsonValue;
use tracing::debug;

/// What happened when a backend run was reconciled into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The local copy was replaced.
    Applied,
    /// No local copy exists, so the response was discarded.
    Dropped,
}

/// Ordered collection of runs and the selected run id.
#[derive(Debug, Clone, Default)]
pub struct RunStore {
    runs: Vec<WorkflowRun>,
    selected: Option<RunId>,
}

impl RunStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all runs in display order.
    #[must_use]
    pub fn runs(&self) -> &[WorkflowRun] {
        &self.runs
    }

    /// Returns the run with the given id.
    #[must_use]
    pub fn get(&self, run_id: &RunId) -> Option<&WorkflowRun> {
        self.runs.iter().find(|r| &r.id == run_id)
    }

    /// Returns the selected run id, even if that run is no longer listed.
    #[must_use]
    pub fn selected_id(&self) -> Option<&RunId> {
        self.selected.as_ref()
    }

    /// Returns the selected run.
    #[must_use]
    pub fn selected(&self) -> Option<&WorkflowRun> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Replaces the whole list with a fresh backend listing.
    ///
    /// The first run becomes selected only if nothing is selected yet.
    pub fn replace_all(&mut self, runs: Vec<WorkflowRun>) {
        self.runs = runs;
        if self.selected.is_none() {
            self.selected = self.runs.first().map(|r| r.id.clone());
        }
    }

    /// Prepends a newly created run and selects it.
    ///
    /// A run with the same id already in the list is replaced rather than
    /// duplicated.
    pub fn insert_created(&mut self, run: WorkflowRun) {
        self.runs.retain(|r| r.id != run.id);
        self.selected = Some(run.id.clone());
        self.runs.insert(0, run);
    }

    /// Selects a run. Purely local.
    pub fn select(&mut self, run_id: RunId) {
        self.selected = Some(run_id);
    }

    /// Merges one field into a step of the given run.
    ///
    /// Returns false if the run is not in the store.
    pub fn edit_field(
        &mut self,
        run_id: &RunId,
        step_id: StepId,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> bool {
        match self.runs.iter_mut().find(|r| &r.id == run_id) {
            Some(run) => {
                run.merge_step_field(step_id, field, value);
                true
            }
            None => false,
        }
    }

    /// Replaces the local copy of a run with the backend's version.
    ///
    /// Matching is by run id. A run that is not held locally is not
    /// re-inserted.
    pub fn reconcile(&mut self, run: WorkflowRun) -> Reconciled {
        match self.runs.iter_mut().find(|r| r.id == run.id) {
            Some(slot) => {
                *slot = run;
                Reconciled::Applied
            }
            None => {
                debug!(run_id = %run.id, "dropping response for run not held locally");
                Reconciled::Dropped
            }
        }
    }
}
