//! Tolerant deserializers for collaborator payloads
//!
//! The AI backend is loosely typed: categories come back as free text
//! ("Uncategorized", "to-do"), deadlines as "none", timestamps as RFC 3339
//! strings, epoch seconds or epoch milliseconds. Anything that cannot be
//! understood is read as absent instead of failing the whole payload.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{ActionItem, Category, Priority};

/// Epoch values below this are taken as seconds, above as milliseconds.
const SECONDS_CUTOFF: f64 = 100_000_000_000.0;

pub(crate) fn category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(Category::parse))
}

pub(crate) fn priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(Priority::parse))
}

pub(crate) fn deadline<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
        .map(str::to_string))
}

/// Keep only well-formed action items (objects carrying a `task`)
pub(crate) fn action_items<'de, D>(deserializer: D) -> Result<Vec<ActionItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(|item| item.get("task").and_then(Value::as_str).is_some())
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp).unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
}

pub(crate) fn timestamp_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let millis = if raw.abs() < SECONDS_CUTOFF { raw * 1000.0 } else { raw };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            s.parse::<f64>()
                .ok()
                .and_then(|n| parse_timestamp(&Value::from(n)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp(&json!("2024-01-15T09:30:00Z")).unwrap();
        assert_eq!(ts.timestamp(), 1_705_311_000);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = parse_timestamp(&json!("2024-01-15T09:30:00")).unwrap();
        assert_eq!(ts.timestamp(), 1_705_311_000);
    }

    #[test]
    fn test_parse_epoch_seconds_and_millis() {
        let secs = parse_timestamp(&json!(1_705_311_000.5)).unwrap();
        let millis = parse_timestamp(&json!(1_705_311_000_500i64)).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }
}
