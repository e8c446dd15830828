//! Canonical place entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;
use crate::normalize;
use crate::value_objects::Coordinate;

/// A recommended place, normalized from any accepted wire shape.
///
/// Optional fields the backend did not resolve stay absent; decoding a
/// place never fails for a missing or reshaped field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Stable identifier, unique within one response batch
    pub id: i64,
    /// Display title; empty string when unresolvable
    pub title: String,
    /// Free-form description or street address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pre-formatted distance text, e.g. "0.4 mi"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_text: Option<String>,
    /// Pre-formatted walking time text, e.g. "8 min"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_time_text: Option<String>,
    /// Location, present only when both components arrived finite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Pre-formatted popularity label, e.g. "⭐ 4.5"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_label: Option<String>,
    /// Photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Place {
    /// Normalize a single raw wire object into a `Place`.
    ///
    /// For batch responses prefer [`crate::normalize_places`], which keeps
    /// synthesized ids unique across the batch.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedEntity`] only when the value is not
    /// a JSON object; field-level problems degrade to absent fields.
    pub fn from_wire(value: &Value) -> Result<Self, DomainError> {
        normalize::place_from_value(value, 0, 1)
    }
}
