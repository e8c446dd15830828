//! Domain-level errors

use thiserror::Error;

use crate::polyline::PolylineError;
use crate::value_objects::InvalidCoordinates;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Wire payload is structurally unusable for the target entity
    #[error("Malformed entity: {0}")]
    MalformedEntity(String),

    /// Route geometry string could not be decoded
    #[error(transparent)]
    Polyline(#[from] PolylineError),

    /// Coordinates outside the valid range
    #[error(transparent)]
    InvalidCoordinates(#[from] InvalidCoordinates),
}

impl DomainError {
    /// Create a malformed-entity error
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedEntity(detail.into())
    }
}
