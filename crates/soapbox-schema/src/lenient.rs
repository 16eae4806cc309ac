//! Field-level fallbacks: a malformed value turns into the field default
//! instead of failing the record it belongs to.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Any value that does not deserialize as `T` becomes `T::default()`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Ids arrive as strings from most servers and as numbers from a few.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => id,
        Value::Number(id) => id.to_string(),
        _ => String::new(),
    })
}

/// Optional id with the same coercion as [`id`]. Empty strings read as absent.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = id(deserializer)?;
    Ok((!id.is_empty()).then_some(id))
}

/// Counters given either as numbers or numeric strings.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Array whose malformed elements are dropped instead of failing the array.
pub(crate) fn filtered<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Boolean flag that defaults to `true`.
pub(crate) fn flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(true))
}

pub(crate) fn yes() -> bool {
    true
}

/// Current time in the wire format.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keep a valid RFC 3339 timestamp, replace anything else with now.
pub(crate) fn datetime_or_now(value: String) -> String {
    if DateTime::parse_from_rfc3339(&value).is_ok() {
        value
    } else {
        now()
    }
}

/// Keep a valid RFC 3339 timestamp, drop anything else.
pub(crate) fn valid_datetime(value: Option<String>) -> Option<String> {
    value.filter(|value| DateTime::parse_from_rfc3339(value).is_ok())
}

/// Treat empty strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Replace an empty string with `fallback`.
pub(crate) fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Remove derived keys that a previous normalization pass emitted, so they
/// are recomputed rather than carried along as unknown fields.
pub(crate) fn strip(extra: &mut Map<String, Value>, derived: &[&str]) {
    for key in derived {
        extra.remove(*key);
    }
}

pub(crate) fn map_flag(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

pub(crate) fn map_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "id")]
        id: String,
        #[serde(deserialize_with = "count")]
        hits: u64,
        #[serde(deserialize_with = "or_default")]
        label: String,
        #[serde(deserialize_with = "filtered")]
        tags: Vec<String>,
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let sample: Sample = serde_json::from_value(json!({
            "id": 42,
            "hits": "7",
            "label": { "nested": true },
            "tags": ["a", 1, "b", null],
        }))
        .unwrap();
        assert_eq!(sample.id, "42");
        assert_eq!(sample.hits, 7);
        assert_eq!(sample.label, "");
        assert_eq!(sample.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_datetime_or_now() {
        let valid = "2022-01-01T00:00:00.000Z".to_string();
        assert_eq!(datetime_or_now(valid.clone()), valid);
        let replaced = datetime_or_now("yesterday".into());
        assert!(DateTime::parse_from_rfc3339(&replaced).is_ok());
    }
}
