//! Value objects shared across entities

mod coordinate;

pub use coordinate::{Coordinate, InvalidCoordinates};
