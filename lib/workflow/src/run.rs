//! Workflow runs and their step records.

use crate::data::StepData;
use crate::error::RunValidationError;
use crate::step::StepId;
use deal_desk_core::{RunId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

fn null_as_empty<'de, D>(deserializer: D) -> Result<StepData, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StepData>::deserialize(deserializer)?.unwrap_or_default())
}

/// Data recorded for one step of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step this record belongs to; unique within a run.
    pub step_id: StepId,
    /// Field map for the step. A `null` from the backend reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: StepData,
}

impl StepRecord {
    /// Creates a record with no data.
    #[must_use]
    pub fn empty(step_id: StepId) -> Self {
        Self {
            step_id,
            data: StepData::new(),
        }
    }
}

/// One investigation, as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Backend-assigned identifier.
    pub id: RunId,
    /// Short human-readable title.
    pub label: String,
    /// Optional free-text address.
    #[serde(default)]
    pub address: Option<String>,
    /// When the backend created the run.
    pub created_at: Timestamp,
    /// When the backend last changed the run.
    pub updated_at: Timestamp,
    /// Lifecycle status, owned by the backend.
    pub status: String,
    /// Step records. Order carries no meaning; lookup is by step id.
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl WorkflowRun {
    /// Returns the record for `step_id`, if one exists.
    #[must_use]
    pub fn step(&self, step_id: StepId) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Returns the data for `step_id`, or an empty map when there is no record.
    #[must_use]
    pub fn step_data(&self, step_id: StepId) -> StepData {
        self.step(step_id)
            .map(|s| s.data.clone())
            .unwrap_or_default()
    }

    /// Merges a single field into a step's data.
    ///
    /// A missing record is synthesized and appended; an existing record is
    /// updated in place. Other keys and other steps are untouched.
    pub fn merge_step_field(
        &mut self,
        step_id: StepId,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) {
        let index = match self.steps.iter().position(|s| s.step_id == step_id) {
            Some(index) => index,
            None => {
                self.steps.push(StepRecord::empty(step_id));
                self.steps.len() - 1
            }
        };
        self.steps[index].data.merge_field(field, value);
    }

    /// Checks the invariants a run must hold when ingested from the backend.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: an empty label, a repeated step id,
    /// or a structured value with an unsupported shape.
    pub fn validate(&self) -> Result<(), RunValidationError> {
        if self.label.trim().is_empty() {
            return Err(RunValidationError::EmptyLabel {
                run_id: self.id.clone(),
            });
        }
        let mut seen = HashSet::new();
        for record in &self.steps {
            if !seen.insert(record.step_id) {
                return Err(RunValidationError::DuplicateStep {
                    run_id: self.id.clone(),
                    step_id: record.step_id,
                });
            }
            record
                .data
                .check_shapes(record.step_id)
                .map_err(|source| RunValidationError::Shape {
                    run_id: self.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
