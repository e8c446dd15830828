//! Tolerant place normalization
//!
//! The backend has shipped at least two field-naming generations for the
//! same place concept (a simple shape and a provider-style shape). Each
//! canonical field resolves through an explicit ordered alias table; the
//! first present value wins and absence is never an error.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::entities::Place;
use crate::errors::DomainError;
use crate::value_objects::Coordinate;

/// Alias priority per canonical field. Order matters.
const TITLE_ALIASES: &[&str] = &["name", "title"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "address"];
const DISTANCE_ALIASES: &[&str] = &["distance", "distance_text"];
const WALK_TIME_ALIASES: &[&str] = &["walk_time", "walkTime", "duration_text"];
const IMAGE_ALIASES: &[&str] = &["photo_url", "image"];

/// Normalize a batch of raw place objects from one response.
///
/// Ids are taken from the wire when present and non-zero, synthesized
/// deterministically otherwise, and made unique within the batch.
///
/// # Errors
///
/// Returns [`DomainError::MalformedEntity`] if any element is not a JSON
/// object. Field-level problems never fail the batch.
pub fn normalize_places(values: &[Value]) -> Result<Vec<Place>, DomainError> {
    let mut seen_ids = HashSet::new();

    values
        .iter()
        .enumerate()
        .map(|(ordinal, value)| {
            let mut place = place_from_value(value, ordinal, values.len())?;
            while !seen_ids.insert(place.id) {
                place.id = stable_id(&format!("collision|{}|{ordinal}", place.id));
            }
            Ok(place)
        })
        .collect()
}

/// Normalize one raw place object.
///
/// `ordinal` is the object's position within its response batch and
/// `batch_len` the batch size; both feed the synthesized id so ids are
/// unique within a response and stable across re-fetches of the same data.
pub(crate) fn place_from_value(
    value: &Value,
    ordinal: usize,
    batch_len: usize,
) -> Result<Place, DomainError> {
    let object = value
        .as_object()
        .ok_or_else(|| DomainError::malformed("place payload is not an object"))?;

    let title = first_string(object, TITLE_ALIASES).unwrap_or_default();
    let coordinate = resolve_coordinate(object);

    let id = match object.get("id").and_then(Value::as_i64) {
        Some(id) if id != 0 => id,
        _ => synthesize_id(object, &title, coordinate, ordinal, batch_len),
    };

    Ok(Place {
        id,
        title,
        description: first_string(object, DESCRIPTION_ALIASES),
        distance_text: first_string(object, DISTANCE_ALIASES),
        walk_time_text: first_string(object, WALK_TIME_ALIASES),
        coordinate,
        popularity_label: resolve_popularity(object),
        image_url: first_string(object, IMAGE_ALIASES),
    })
}

/// First alias present with a string value wins.
fn first_string(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Nested `location:{lat,lng}` object wins over flat `lat`/`lng` scalars.
/// Emits a coordinate only when both components are present and valid.
fn resolve_coordinate(object: &Map<String, Value>) -> Option<Coordinate> {
    let (lat, lng) = if let Some(location) = object.get("location").and_then(Value::as_object) {
        (
            location.get("lat").and_then(Value::as_f64),
            location.get("lng").and_then(Value::as_f64),
        )
    } else {
        (
            object.get("lat").and_then(Value::as_f64),
            object.get("lng").and_then(Value::as_f64),
        )
    };

    match (lat, lng) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
        _ => None,
    }
}

/// Numeric `rating` (integer or fractional) renders as a one-decimal star
/// label; a pre-formatted `popularity` string is second choice.
fn resolve_popularity(object: &Map<String, Value>) -> Option<String> {
    if let Some(rating) = object.get("rating").and_then(Value::as_f64) {
        return Some(format!("⭐ {rating:.1}"));
    }
    object
        .get("popularity")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Synthesize a deterministic id for a place the backend left unidentified.
///
/// Keyed on the provider `place_id` when present, else on title, rounded
/// coordinate and ordinal position; the batch length is mixed in as the
/// per-batch base.
fn synthesize_id(
    object: &Map<String, Value>,
    title: &str,
    coordinate: Option<Coordinate>,
    ordinal: usize,
    batch_len: usize,
) -> i64 {
    let key = match object.get("place_id").and_then(Value::as_str) {
        Some(place_id) => format!("{batch_len}|{place_id}"),
        None => {
            let (lat, lng) = coordinate
                .map_or((0.0, 0.0), |c| (c.latitude(), c.longitude()));
            format!("{batch_len}|{title}|{lat:.4}|{lng:.4}|{ordinal}")
        }
    };
    stable_id(&key)
}

/// Positive 63-bit id from a BLAKE3 hash, stable across runs and releases.
fn stable_id(key: &str) -> i64 {
    let digest = blake3::hash(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    #[allow(clippy::cast_possible_wrap)]
    let id = (u64::from_le_bytes(bytes) & (u64::MAX >> 1)) as i64;
    // Zero is the wire's "missing id" sentinel; never synthesize it.
    if id == 0 { 1 } else { id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place(value: Value) -> Place {
        Place::from_wire(&value).expect("place decodes")
    }

    #[test]
    fn simple_generation_decodes() {
        let p = place(json!({
            "id": 3,
            "title": "Roberta's",
            "description": "Wood-fired pizza",
            "distance": "0.6 mi",
            "walkTime": "12 min",
            "lat": 40.705,
            "lng": -73.933,
            "popularity": "Busy",
            "image": "https://img.example/robertas.jpg",
        }));

        assert_eq!(p.id, 3);
        assert_eq!(p.title, "Roberta's");
        assert_eq!(p.description.as_deref(), Some("Wood-fired pizza"));
        assert_eq!(p.distance_text.as_deref(), Some("0.6 mi"));
        assert_eq!(p.walk_time_text.as_deref(), Some("12 min"));
        assert!(p.coordinate.is_some());
        assert_eq!(p.popularity_label.as_deref(), Some("Busy"));
        assert_eq!(p.image_url.as_deref(), Some("https://img.example/robertas.jpg"));
    }

    #[test]
    fn provider_generation_decodes() {
        let p = place(json!({
            "place_id": "ChIJd8kTq1ZbwokRteTn5yhzCzI",
            "name": "Roberta's",
            "address": "261 Moore St",
            "distance_text": "0.6 mi",
            "duration_text": "12 min",
            "location": {"lat": 40.705, "lng": -73.933},
            "rating": 4.5,
            "photo_url": "https://img.example/robertas.jpg",
        }));

        assert_ne!(p.id, 0);
        assert_eq!(p.title, "Roberta's");
        assert_eq!(p.description.as_deref(), Some("261 Moore St"));
        assert_eq!(p.distance_text.as_deref(), Some("0.6 mi"));
        assert_eq!(p.walk_time_text.as_deref(), Some("12 min"));
        assert_eq!(p.popularity_label.as_deref(), Some("⭐ 4.5"));
        assert_eq!(p.image_url.as_deref(), Some("https://img.example/robertas.jpg"));
    }

    #[test]
    fn name_wins_over_title() {
        let p = place(json!({"name": "New Name", "title": "Old Title"}));
        assert_eq!(p.title, "New Name");
    }

    #[test]
    fn title_falls_back_to_empty_string() {
        let p = place(json!({"id": 9}));
        assert_eq!(p.title, "");
    }

    #[test]
    fn description_wins_over_address() {
        let p = place(json!({"description": "a bar", "address": "5th Ave"}));
        assert_eq!(p.description.as_deref(), Some("a bar"));
    }

    #[test]
    fn walk_time_alias_priority() {
        let p = place(json!({"walk_time": "5 min", "walkTime": "6 min", "duration_text": "7 min"}));
        assert_eq!(p.walk_time_text.as_deref(), Some("5 min"));

        let p = place(json!({"walkTime": "6 min", "duration_text": "7 min"}));
        assert_eq!(p.walk_time_text.as_deref(), Some("6 min"));
    }

    #[test]
    fn nested_location_wins_over_flat_fields() {
        let p = place(json!({
            "location": {"lat": 40.0, "lng": -73.0},
            "lat": 1.0,
            "lng": 2.0,
        }));
        let c = p.coordinate.expect("coordinate");
        assert!((c.latitude() - 40.0).abs() < f64::EPSILON);
        assert!((c.longitude() - -73.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lone_latitude_yields_no_coordinate() {
        let p = place(json!({"lat": 40.7}));
        assert!(p.coordinate.is_none());
    }

    #[test]
    fn out_of_range_coordinate_degrades_to_absent() {
        let p = place(json!({"lat": 40.7, "lng": 999.0}));
        assert!(p.coordinate.is_none());
    }

    #[test]
    fn integer_rating_formats_to_one_decimal() {
        let p = place(json!({"rating": 4}));
        assert_eq!(p.popularity_label.as_deref(), Some("⭐ 4.0"));
    }

    #[test]
    fn rating_wins_over_popularity_string() {
        let p = place(json!({"rating": 4.25, "popularity": "Busy"}));
        assert_eq!(p.popularity_label.as_deref(), Some("⭐ 4.2"));
    }

    #[test]
    fn missing_optional_fields_are_absent_not_errors() {
        for field in [
            "description",
            "distance",
            "walk_time",
            "lat",
            "rating",
            "photo_url",
        ] {
            let mut object = json!({
                "id": 1,
                "name": "Spot",
                "description": "d",
                "distance": "1 mi",
                "walk_time": "2 min",
                "lat": 40.0,
                "lng": -73.0,
                "rating": 4.0,
                "photo_url": "u",
            });
            object
                .as_object_mut()
                .expect("object")
                .remove(field);
            assert!(Place::from_wire(&object).is_ok(), "removing {field} must not fail");
        }
    }

    #[test]
    fn wrongly_typed_field_degrades_to_absent() {
        let p = place(json!({"name": "Spot", "distance": 42, "photo_url": true}));
        assert!(p.distance_text.is_none());
        assert!(p.image_url.is_none());
    }

    #[test]
    fn zero_id_is_synthesized() {
        let p = place(json!({"id": 0, "name": "Spot", "lat": 40.0, "lng": -73.0}));
        assert_ne!(p.id, 0);
    }

    #[test]
    fn synthesized_id_is_deterministic() {
        let raw = json!({"name": "Spot", "lat": 40.0, "lng": -73.0});
        let batch = [raw.clone(), json!({"name": "Other"})];

        let first = normalize_places(&batch).expect("batch decodes");
        let second = normalize_places(&batch).expect("batch decodes");
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[1].id, second[1].id);
    }

    #[test]
    fn identical_places_at_different_ordinals_get_distinct_ids() {
        let raw = json!({"name": "Spot", "lat": 40.0, "lng": -73.0});
        let batch = [raw.clone(), raw];

        let places = normalize_places(&batch).expect("batch decodes");
        assert_ne!(places[0].id, places[1].id);
    }

    #[test]
    fn duplicate_supplied_ids_are_made_unique() {
        let batch = [
            json!({"id": 5, "name": "A"}),
            json!({"id": 5, "name": "B"}),
        ];
        let places = normalize_places(&batch).expect("batch decodes");
        assert_eq!(places[0].id, 5);
        assert_ne!(places[1].id, 5);
    }

    #[test]
    fn duplicate_place_ids_are_made_unique() {
        let batch = [
            json!({"place_id": "abc", "name": "A"}),
            json!({"place_id": "abc", "name": "B"}),
        ];
        let places = normalize_places(&batch).expect("batch decodes");
        assert_ne!(places[0].id, places[1].id);
    }

    #[test]
    fn place_id_keys_the_synthesized_id() {
        let with_place_id = normalize_places(&[json!({"place_id": "abc", "name": "A"})])
            .expect("decodes");
        let without = normalize_places(&[json!({"name": "A"})]).expect("decodes");
        assert_ne!(with_place_id[0].id, without[0].id);
    }

    #[test]
    fn malformed_element_fails_the_batch() {
        let batch = [json!({"name": "ok"}), json!(17)];
        assert!(normalize_places(&batch).is_err());
    }

    #[test]
    fn stable_id_is_positive() {
        for key in ["", "a", "Spot|40.0000|-73.0000|0", "2|ChIJ"] {
            assert!(stable_id(key) > 0, "key {key:?}");
        }
    }
}
