//! Per-step data maps.
//!
//! A step's data is an open mapping from field name to JSON value. Two shapes
//! share the map: backend-populated structured keys (see
//! [`StepDefinition::structured`](crate::step::StepDefinition)) and the
//! user-editable freeform field. Presence of a structured key is meaningful on
//! its own: a key holding an empty string still means the step was attempted.

use crate::error::ShapeError;
use crate::step::StepId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Placeholder rendered for missing or empty structured values.
pub const EMPTY_VALUE: &str = "—";

/// Field map of a single step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepData(Map<String, JsonValue>);

impl StepData {
    /// Creates an empty data map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// Returns true if `field` is present, whatever its value.
    #[must_use]
    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns true if no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sets one field, leaving every other key untouched.
    pub fn merge_field(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Returns the text of a freeform field, or `""` when absent or not text.
    #[must_use]
    pub fn text(&self, field: &str) -> &str {
        self.0.get(field).and_then(JsonValue::as_str).unwrap_or("")
    }

    /// Returns true if any structured key declared for `step` is present.
    #[must_use]
    pub fn has_structured(&self, step: StepId) -> bool {
        step.definition()
            .structured
            .iter()
            .any(|field| self.contains_key(field.key))
    }

    /// Decodes the structured extension for `step`.
    ///
    /// Returns `None` for steps without structured fields and for steps where
    /// none of the structured keys is present.
    #[must_use]
    pub fn structured(&self, step: StepId) -> Option<StructuredFields> {
        if !self.has_structured(step) {
            return None;
        }
        match step {
            StepId::BeaconTax => Some(StructuredFields::Assessor(AssessorFields {
                owner: self.scalar("owner"),
                parcel_id: self.scalar("parcel_id"),
                acreage: self.scalar("acreage"),
                value: self.scalar("value"),
            })),
            StepId::SecretaryOfState => {
                Some(StructuredFields::EntityRegistry(EntityRegistryFields {
                    registered_agent: self.scalar("registered_agent"),
                    registered_office_address: self.scalar("registered_office_address"),
                    status: self.scalar("status"),
                    officers: self.get("officers").map(list_text),
                }))
            }
            _ => None,
        }
    }

    /// Checks that the structured keys present for `step` hold acceptable shapes.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] naming the first offending key.
    pub fn check_shapes(&self, step: StepId) -> Result<(), ShapeError> {
        for field in step.definition().structured {
            let Some(value) = self.get(field.key) else {
                continue;
            };
            let ok = if field.key == "officers" {
                match value {
                    JsonValue::Array(items) => items.iter().all(is_scalar),
                    other => is_scalar(other),
                }
            } else {
                is_scalar(value)
            };
            if !ok {
                return Err(ShapeError {
                    step_id: step,
                    field: field.key.to_string(),
                });
            }
        }
        Ok(())
    }

    fn scalar(&self, key: &str) -> Option<String> {
        self.get(key).map(scalar_text)
    }
}

impl From<Map<String, JsonValue>> for StepData {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, JsonValue)> for StepData {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Structured extension of a step's data, tagged by step kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredFields {
    /// Assessor lookup results.
    Assessor(AssessorFields),
    /// Corporate registry lookup results.
    EntityRegistry(EntityRegistryFields),
}

/// Assessor (`beacon_tax`) fields. `Some("")` means attempted but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessorFields {
    pub owner: Option<String>,
    pub parcel_id: Option<String>,
    pub acreage: Option<String>,
    pub value: Option<String>,
}

/// Corporate registry (`secretary_of_state`) fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRegistryFields {
    pub registered_agent: Option<String>,
    pub registered_office_address: Option<String>,
    pub status: Option<String>,
    pub officers: Option<Vec<String>>,
}

/// Renders a structured value for display, using [`EMPTY_VALUE`] for gaps.
#[must_use]
pub fn display_value(value: Option<&JsonValue>) -> String {
    let text = match value {
        None => String::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(scalar_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => scalar_text(other),
    };
    if text.is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        text
    }
}

fn is_scalar(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}

fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn list_text(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items.iter().map(scalar_text).collect(),
        JsonValue::Null => Vec::new(),
        other => {
            let text = scalar_text(other);
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    }
}
