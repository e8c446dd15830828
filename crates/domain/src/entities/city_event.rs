//! Permitted city event entity

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;
use crate::value_objects::Coordinate;

/// A permitted public event from the city events feed.
///
/// Every field is optional on the wire; an event with nothing usable is
/// still a valid (if empty) entity, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEvent {
    /// Event name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Start time, when the feed supplied a parseable timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Venue location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Street address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CityEvent {
    /// Normalize a raw wire object into a `CityEvent`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedEntity`] only when the value is not
    /// a JSON object.
    pub fn from_wire(value: &Value) -> Result<Self, DomainError> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::malformed("event payload is not an object"))?;

        let coordinate = match (
            object.get("latitude").and_then(Value::as_f64),
            object.get("longitude").and_then(Value::as_f64),
        ) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        };

        Ok(Self {
            name: object
                .get("event_name")
                .and_then(Value::as_str)
                .map(str::to_owned),
            starts_at: object
                .get("event_start")
                .and_then(Value::as_str)
                .and_then(parse_event_time),
            coordinate,
            address: object
                .get("address")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }
}

/// Parse a feed timestamp, trying the formats the feed has been seen to use.
fn parse_event_time(s: &str) -> Option<DateTime<Utc>> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_event_decodes() {
        let event = CityEvent::from_wire(&json!({
            "event_name": "Summer Streets",
            "event_start": "2025-08-09T07:00:00.000",
            "latitude": 40.7291,
            "longitude": -73.9965,
            "address": "Lafayette St",
        }))
        .expect("decodes");

        assert_eq!(event.name.as_deref(), Some("Summer Streets"));
        assert!(event.starts_at.is_some());
        assert!(event.coordinate.is_some());
        assert_eq!(event.address.as_deref(), Some("Lafayette St"));
    }

    #[test]
    fn empty_object_is_a_valid_event() {
        let event = CityEvent::from_wire(&json!({})).expect("decodes");
        assert_eq!(event, CityEvent {
            name: None,
            starts_at: None,
            coordinate: None,
            address: None,
        });
    }

    #[test]
    fn unparseable_start_time_degrades_to_absent() {
        let event = CityEvent::from_wire(&json!({
            "event_name": "Street Fair",
            "event_start": "next saturday",
        }))
        .expect("decodes");
        assert!(event.starts_at.is_none());
    }

    #[test]
    fn partial_coordinates_degrade_to_absent() {
        let event = CityEvent::from_wire(&json!({"latitude": 40.7})).expect("decodes");
        assert!(event.coordinate.is_none());

        let event = CityEvent::from_wire(&json!({"latitude": 40.7, "longitude": 500.0}))
            .expect("decodes");
        assert!(event.coordinate.is_none());
    }

    #[test]
    fn rfc3339_start_time_parses() {
        let event = CityEvent::from_wire(&json!({
            "event_start": "2025-08-09T07:00:00-04:00",
        }))
        .expect("decodes");
        let starts_at = event.starts_at.expect("parsed");
        assert_eq!(starts_at.to_rfc3339(), "2025-08-09T11:00:00+00:00");
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(CityEvent::from_wire(&json!(null)).is_err());
        assert!(CityEvent::from_wire(&json!("event")).is_err());
    }
}
