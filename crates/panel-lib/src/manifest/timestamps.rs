//! Canonical RFC 3339 timestamps for time-valued manifest fields

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Keys whose values are timestamps wherever they appear
pub const TIMESTAMP_KEYS: &[&str] = &[
    "creationTimestamp",
    "lastProbeTime",
    "lastTransitionTime",
    "finishedAt",
    "startedAt",
    "startTime",
    "time",
    "lastUpdateTime",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn from_date_string(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Canonical form of a single timestamp value, `None` when it should stay as is
fn canonical(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch).map(format_utc),
        // Serialized date objects carry the wall time under `date`
        Value::Object(map) => map
            .get("date")
            .and_then(Value::as_str)
            .and_then(from_date_string)
            .map(format_utc),
        _ => None,
    }
}

/// Rewrite numeric and date-object timestamps anywhere below `value`.
/// Strings and nulls are left untouched.
pub fn canonicalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if TIMESTAMP_KEYS.contains(&key.as_str()) {
                    if let Some(text) = canonical(child) {
                        *child = Value::String(text);
                        continue;
                    }
                }
                canonicalize_timestamps(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(canonicalize_timestamps),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_epoch_seconds_become_utc_strings() {
        let mut value = json!({"status": {"startTime": 1729083600}});
        canonicalize_timestamps(&mut value);
        assert_eq!(value["status"]["startTime"], "2024-10-16T13:00:00Z");
    }

    #[test]
    fn test_fractional_epoch_truncates_to_seconds() {
        let mut value = json!({"time": 1729083600.75});
        canonicalize_timestamps(&mut value);
        assert_eq!(value["time"], "2024-10-16T13:00:00Z");
    }

    #[test]
    fn test_date_objects_are_rewritten() {
        let mut value = json!({
            "conditions": [{
                "lastTransitionTime": {
                    "date": "2024-10-16 13:08:07.000000",
                    "timezone_type": 3,
                    "timezone": "UTC"
                }
            }]
        });
        canonicalize_timestamps(&mut value);
        assert_eq!(
            value["conditions"][0]["lastTransitionTime"],
            "2024-10-16T13:08:07Z"
        );
    }

    #[test]
    fn test_strings_and_nulls_untouched() {
        let mut value = json!({
            "metadata": {"creationTimestamp": null},
            "status": {"startTime": "yesterday"}
        });
        let before = value.clone();
        canonicalize_timestamps(&mut value);
        assert_eq!(value, before);
    }

    #[test]
    fn test_other_keys_untouched() {
        let mut value = json!({"spec": {"replicas": 3, "terminationGracePeriodSeconds": 30}});
        let before = value.clone();
        canonicalize_timestamps(&mut value);
        assert_eq!(value, before);
    }
}
