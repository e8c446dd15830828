//! Typed endpoint payloads
//!
//! Canonical shapes the transport hands to callers, each with a tolerant
//! constructor from the raw response body.

use domain::{CityEvent, Coordinate, Place, Weather, normalize_places, polyline};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Assistant reply from the chat endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Assistant text
    pub reply: String,
    /// Optional vibe tag for theming
    pub vibe: Option<String>,
    /// Recommended places, normalized as one batch
    pub places: Vec<Place>,
    /// Current weather; absent when missing or unusable
    pub weather: Option<Weather>,
}

impl ChatReply {
    pub(crate) fn from_body(body: &Value) -> Result<Self, ApiError> {
        let reply = body
            .get("reply")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Decode("chat response missing reply".to_string()))?
            .to_owned();

        let places = match body.get("places").and_then(Value::as_array) {
            Some(raw) => normalize_places(raw)?,
            None => Vec::new(),
        };

        // Weather is decoration on a chat reply; a malformed blob must not
        // fail the message.
        let weather = body.get("weather").and_then(|raw| Weather::from_wire(raw).ok());

        Ok(Self {
            reply,
            vibe: body.get("vibe").and_then(Value::as_str).map(str::to_owned),
            places,
            weather,
        })
    }
}

/// One page of recommendations for a category
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationPage {
    /// Category the page was requested for
    pub category: String,
    /// Normalized places
    pub places: Vec<Place>,
}

impl RecommendationPage {
    /// `requested` labels the page when the body carries no category of
    /// its own, as the top-recommendations feed does not.
    pub(crate) fn from_body(body: &Value, requested: &str) -> Result<Self, ApiError> {
        let raw = body
            .get("places")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::Decode("recommendations missing places array".to_string()))?;

        Ok(Self {
            category: body
                .get("category")
                .and_then(Value::as_str)
                .unwrap_or(requested)
                .to_owned(),
            places: normalize_places(raw)?,
        })
    }
}

/// Walking directions to a destination
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsSummary {
    /// Pre-formatted total distance
    pub distance_text: Option<String>,
    /// Pre-formatted total duration
    pub duration_text: Option<String>,
    /// Deep link into an external maps app
    pub maps_link: Option<String>,
    /// Decoded route geometry, when the backend supplied one
    pub route: Option<Vec<Coordinate>>,
}

impl DirectionsSummary {
    pub(crate) fn from_body(body: &Value) -> Result<Self, ApiError> {
        if !body.is_object() {
            return Err(ApiError::Decode(
                "directions response is not an object".to_string(),
            ));
        }

        let route = body
            .get("polyline")
            .and_then(Value::as_str)
            .map(polyline::decode)
            .transpose()
            .map_err(|err| ApiError::Decode(err.to_string()))?;

        Ok(Self {
            distance_text: string_field(body, "distance_text"),
            duration_text: string_field(body, "duration_text"),
            maps_link: string_field(body, "maps_link"),
            route,
        })
    }
}

pub(crate) fn events_from_body(body: &Value) -> Result<Vec<CityEvent>, ApiError> {
    let raw = body
        .get("nyc_permitted")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Decode("events response missing nyc_permitted".to_string()))?;

    raw.iter()
        .map(|value| CityEvent::from_wire(value).map_err(ApiError::from))
        .collect()
}

/// Account profile returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier
    pub id: i64,
    /// Login email
    pub email: String,
    /// Given name, when provided at signup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Saved home address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_address: Option<String>,
}

/// `{token, user}` body of a successful login or signup
#[derive(Debug, Deserialize)]
pub(crate) struct AuthBody {
    pub token: String,
    pub user: UserProfile,
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_owned)
}
