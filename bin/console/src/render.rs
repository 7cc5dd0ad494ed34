//! Plain-text rendering of runs and step panels.

use deal_desk_core::RunId;
use deal_desk_workflow::{EMPTY_VALUE, StepData, StepDefinition, StepId, WorkflowRun, display_value};
use serde_json::Value as JsonValue;
use std::fmt::Write;

/// Renders the run list, marking the selected run.
#[must_use]
pub fn run_list(runs: &[WorkflowRun], selected: Option<&RunId>) -> String {
    if runs.is_empty() {
        return "no investigations yet".to_string();
    }
    let mut out = String::new();
    for run in runs {
        let marker = if Some(&run.id) == selected { '*' } else { ' ' };
        let _ = write!(out, "{marker} {}  {}", run.id, run.label);
        if let Some(address) = &run.address {
            let _ = write!(out, " ({address})");
        }
        let _ = writeln!(out, "  [{}]", run.status);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Renders a run header followed by every step panel in catalog order.
#[must_use]
pub fn run_detail(run: &WorkflowRun, running: Option<StepId>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", run.id, run.label);
    if let Some(address) = &run.address {
        let _ = writeln!(out, "address: {address}");
    }
    let _ = writeln!(out, "status:  {}", run.status);
    let _ = writeln!(out, "created: {}", run.created_at);
    let _ = writeln!(out, "updated: {}", run.updated_at);
    for step_id in StepId::ALL {
        out.push('\n');
        out.push_str(&step_panel(
            step_id.definition(),
            &run.step_data(step_id),
            running == Some(step_id),
        ));
    }
    out.truncate(out.trim_end().len());
    out
}

/// Renders one step panel.
///
/// The structured block appears only when at least one structured key is
/// present, even if its value is empty.
#[must_use]
pub fn step_panel(definition: &StepDefinition, data: &StepData, running: bool) -> String {
    let mut out = String::new();
    let _ = write!(out, "[{}] {}", definition.id, definition.title);
    if running {
        out.push_str("  (running...)");
    }
    out.push('\n');
    let _ = writeln!(out, "  {}", definition.description);

    if data.has_structured(definition.id) {
        for field in definition.structured {
            match data.get(field.key) {
                Some(JsonValue::Array(items)) if !items.is_empty() => {
                    let _ = writeln!(out, "  {}:", field.label);
                    for item in items {
                        let _ = writeln!(out, "    - {}", display_value(Some(item)));
                    }
                }
                value => {
                    let _ = writeln!(out, "  {}: {}", field.label, display_value(value));
                }
            }
        }
    }

    let notes = data.text(definition.freeform_field);
    let notes = if notes.is_empty() { EMPTY_VALUE } else { notes };
    let _ = writeln!(out, "  Notes: {notes}");
    out
}
