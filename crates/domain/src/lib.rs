//! Domain layer for the CityVibes client
//!
//! Canonical entities, value objects, tolerant wire normalization and the
//! route-geometry codec. This layer performs no I/O; everything here is a
//! pure function of its input.

pub mod entities;
pub mod errors;
pub mod normalize;
pub mod polyline;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use normalize::normalize_places;
pub use polyline::PolylineError;
pub use value_objects::*;
