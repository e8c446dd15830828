//! Canonical entities all wire variants converge to

mod city_event;
mod place;
mod weather;

pub use city_event::CityEvent;
pub use place::Place;
pub use weather::{ConditionIcon, Weather};
