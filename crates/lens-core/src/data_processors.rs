use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::models::MIN_PLAUSIBLE_TIMESTAMP_MS;

// ── NumberParser ──────────────────────────────────────────────────────────────

/// Reads numbers out of loosely-typed JSON values.
///
/// History exports are not consistent about numeric fields: the same column
/// may arrive as a JSON number, a numeric string, or `null`.
pub struct NumberParser;

impl NumberParser {
    /// Parse a [`serde_json::Value`] into a finite `f64`.
    ///
    /// Handles:
    /// * JSON number → its `f64` value.
    /// * JSON string → trimmed and parsed (`"1.5"`, `"1700000000000000"`).
    /// * anything else (`null`, bool, array, object) → `None`.
    ///
    /// `NaN` and infinities are rejected.
    pub fn parse(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite())
    }
}

// ── serde helpers ─────────────────────────────────────────────────────────────

/// `deserialize_with` helper: tolerant `Option<f64>`.
///
/// Never fails; values that are not numeric become `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(NumberParser::parse))
}

/// `deserialize_with` helper: `Option<String>` where empty and non-string
/// values collapse to `None`.
pub fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Resolves the two raw timestamp encodings into a UTC [`DateTime`].
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Resolve a record's timestamp.
    ///
    /// A non-zero microsecond value wins; otherwise a non-zero millisecond
    /// value is used; otherwise the record has no timestamp. Results earlier
    /// than 1990-01-01 are implausible and resolve to `None`.
    pub fn resolve(time_usec: Option<f64>, time_ms: Option<f64>) -> Option<DateTime<Utc>> {
        let micros = match (time_usec, time_ms) {
            (Some(us), _) if us != 0.0 => us,
            (_, Some(ms)) if ms != 0.0 => ms * 1000.0,
            _ => return None,
        };
        Self::from_micros(micros)
    }

    /// Convert microseconds since the Unix epoch, applying the plausibility floor.
    pub fn from_micros(micros: f64) -> Option<DateTime<Utc>> {
        if !micros.is_finite() {
            return None;
        }
        if micros < Self::floor_micros() {
            debug!(
                "TimestampProcessor: discarding implausible timestamp {} us",
                micros
            );
            return None;
        }
        if micros >= i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_micros(micros.round() as i64)
    }

    fn floor_micros() -> f64 {
        MIN_PLAUSIBLE_TIMESTAMP_MS as f64 * 1000.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
