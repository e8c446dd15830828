//! Canonical weather entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

/// Fixed glyph set for the dashboard weather widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionIcon {
    /// Clear sky, also the fallback for unrecognized conditions
    Clear,
    /// Cloudy or overcast
    Cloud,
    /// Rain or drizzle
    Rain,
    /// Snow
    Snow,
    /// Thunderstorm
    Storm,
}

impl ConditionIcon {
    /// Match a condition keyword, case-insensitively, in fixed order.
    #[must_use]
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();
        if condition.contains("cloud") {
            Self::Cloud
        } else if condition.contains("rain") {
            Self::Rain
        } else if condition.contains("snow") {
            Self::Snow
        } else if condition.contains("storm") {
            Self::Storm
        } else {
            Self::Clear
        }
    }

    /// The display glyph for this condition
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Cloud => "☁️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Storm => "⛈️",
        }
    }

    /// Map a glyph from the already-simplified wire shape back to an icon.
    /// Unrecognized glyphs fall back to `Clear`.
    #[must_use]
    fn from_glyph(glyph: &str) -> Self {
        match glyph {
            "☁️" => Self::Cloud,
            "🌧️" => Self::Rain,
            "❄️" => Self::Snow,
            "⛈️" => Self::Storm,
            _ => Self::Clear,
        }
    }
}

/// Current weather, normalized from either accepted wire shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// Temperature in degrees Fahrenheit, rounded from fractional sources
    pub temperature_f: i32,
    /// Condition icon; always exactly one
    pub icon: ConditionIcon,
}

impl Weather {
    /// Normalize a raw wire object into `Weather`.
    ///
    /// Accepts the simplified `{temp, emoji}` pair and the raw provider
    /// shape `{main: {temp}, weather: [{main}]}`. Temperature has no safe
    /// default, so a value yielding neither is a decode failure.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedEntity`] when the value is not an
    /// object or no temperature is resolvable from either shape.
    pub fn from_wire(value: &Value) -> Result<Self, DomainError> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::malformed("weather payload is not an object"))?;

        let temperature = object
            .get("main")
            .and_then(|main| main.get("temp"))
            .and_then(Value::as_f64)
            .or_else(|| object.get("temp").and_then(Value::as_f64))
            .ok_or_else(|| DomainError::malformed("weather temperature missing"))?;

        let icon = object
            .get("weather")
            .and_then(|list| list.get(0))
            .and_then(|entry| entry.get("main"))
            .and_then(Value::as_str)
            .map(ConditionIcon::from_condition)
            .or_else(|| {
                object
                    .get("emoji")
                    .and_then(Value::as_str)
                    .map(ConditionIcon::from_glyph)
            })
            .unwrap_or(ConditionIcon::Clear);

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            temperature_f: temperature.round() as i32,
            icon,
        })
    }
}
