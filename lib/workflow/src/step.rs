//! The fixed catalog of investigation steps.
//!
//! Every run carries the same six research activities. Their identifiers are
//! a closed set; titles, descriptions, and the structured fields surfaced for
//! each step are static and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the six investigation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Parish assessor lookup (owner, parcel, acreage, valuation).
    BeaconTax,
    /// Corporate registry lookup (agent, officers, entity status).
    SecretaryOfState,
    /// Flood zone and flood risk lookup.
    UsgsFlood,
    /// Open web search.
    GoogleSearch,
    /// Owner background research.
    OwnerIntel,
    /// Proposal framing.
    Proposal,
}

impl StepId {
    /// All steps, in display order.
    pub const ALL: [StepId; 6] = [
        Self::BeaconTax,
        Self::SecretaryOfState,
        Self::UsgsFlood,
        Self::GoogleSearch,
        Self::OwnerIntel,
        Self::Proposal,
    ];

    /// Returns the wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BeaconTax => "beacon_tax",
            Self::SecretaryOfState => "secretary_of_state",
            Self::UsgsFlood => "usgs_flood",
            Self::GoogleSearch => "google_search",
            Self::OwnerIntel => "owner_intel",
            Self::Proposal => "proposal",
        }
    }

    /// Returns the static definition for this step.
    #[must_use]
    pub fn definition(&self) -> &'static StepDefinition {
        // CATALOG is declared in `ALL` order.
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an identifier outside the step catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStepError {
    /// The rejected identifier.
    pub step_id: String,
}

impl fmt::Display for UnknownStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown step: '{}'", self.step_id)
    }
}

impl std::error::Error for UnknownStepError {}

impl FromStr for StepId {
    type Err = UnknownStepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| UnknownStepError {
                step_id: s.to_string(),
            })
    }
}

/// A structured field surfaced separately from freeform notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredField {
    /// Key in the step's data map.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Static description of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    /// The step this definition describes.
    pub id: StepId,
    /// Short title.
    pub title: &'static str,
    /// What the step collects.
    pub description: &'static str,
    /// Name of the user-editable freeform field.
    pub freeform_field: &'static str,
    /// Structured keys surfaced distinctly from the freeform field.
    pub structured: &'static [StructuredField],
}

/// Freeform field shared by every step.
pub const NOTES_FIELD: &str = "notes";

const ASSESSOR_FIELDS: &[StructuredField] = &[
    StructuredField {
        key: "owner",
        label: "Owner",
    },
    StructuredField {
        key: "parcel_id",
        label: "Parcel #",
    },
    StructuredField {
        key: "acreage",
        label: "Acreage",
    },
    StructuredField {
        key: "value",
        label: "Assessed Value",
    },
];

const REGISTRY_FIELDS: &[StructuredField] = &[
    StructuredField {
        key: "registered_agent",
        label: "Registered Agent",
    },
    StructuredField {
        key: "registered_office_address",
        label: "Agent Address",
    },
    StructuredField {
        key: "status",
        label: "Status",
    },
    StructuredField {
        key: "officers",
        label: "Officers",
    },
];

static CATALOG: [StepDefinition; 6] = [
    StepDefinition {
        id: StepId::BeaconTax,
        title: "Lafayette Parish Assessor",
        description: "Owner, parcel ID, acreage, valuation, basic property info gathered from the Lafayette Parish Assessor (Beacon) real estate map search.",
        freeform_field: NOTES_FIELD,
        structured: ASSESSOR_FIELDS,
    },
    StepDefinition {
        id: StepId::SecretaryOfState,
        title: "Cora (Secretary of State)",
        description: "Entity name, registered agent, officers / managers, and other entities connected to the owner from coraweb.sos.la.gov.",
        freeform_field: NOTES_FIELD,
        structured: REGISTRY_FIELDS,
    },
    StepDefinition {
        id: StepId::UsgsFlood,
        title: "USGS Flood Data",
        description: "Flood zone classification, flood risk, and key notes from USGS or related flood data tools.",
        freeform_field: NOTES_FIELD,
        structured: &[],
    },
    StepDefinition {
        id: StepId::GoogleSearch,
        title: "Google / Web Search",
        description: "Important links, local news, zoning issues, nearby projects, anything on the open web that affects this deal.",
        freeform_field: NOTES_FIELD,
        structured: &[],
    },
    StepDefinition {
        id: StepId::OwnerIntel,
        title: "Owner Intel",
        description: "Other properties, social / professional background, connections, and what may motivate this owner.",
        freeform_field: NOTES_FIELD,
        structured: &[],
    },
    StepDefinition {
        id: StepId::Proposal,
        title: "Proposal Angle",
        description: "How we want to pitch this project, key benefits, and special design ideas for the eventual proposal.",
        freeform_field: NOTES_FIELD,
        structured: &[],
    },
];

/// Returns every step definition in display order.
#[must_use]
pub fn catalog() -> &'static [StepDefinition] {
    &CATALOG
}
