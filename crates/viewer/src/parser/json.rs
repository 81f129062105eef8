//! Line parser for the JSON log format (one object per line).

use serde_json::Value;

use super::logfmt::parse_timestamp;
use super::model::{Entry, ParseError};

/// Reserved keys mapped onto [`Entry`] fields. Everything else becomes an
/// attribute.
const RESERVED_KEYS: [&str; 5] = ["time", "level", "msg", "span", "parent"];

/// Parse one JSON-format line into an [`Entry`].
///
/// Reserved keys contribute only when their value is a string (a bad
/// `time` string leaves the timestamp unset). Non-string values under
/// unreserved keys are stringified. A line that is not a JSON object is
/// rejected so the stream parser can skip it.
pub fn parse_json_line(line: &str) -> Result<Entry, ParseError> {
    let raw: serde_json::Map<String, Value> = serde_json::from_str(line)?;

    let mut entry = Entry::default();
    let str_field = |raw: &serde_json::Map<String, Value>, key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default()
    };

    if let Some(t) = raw.get("time").and_then(Value::as_str) {
        entry.time = parse_timestamp(t);
    }
    entry.level = str_field(&raw, "level");
    entry.message = str_field(&raw, "msg");
    entry.span = str_field(&raw, "span");
    entry.parent = str_field(&raw, "parent");

    for (key, value) in &raw {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        entry.attrs.insert(key.clone(), stringify(value));
    }

    Ok(entry)
}

/// Render a JSON value as the attribute string the viewer displays.
/// Strings are taken verbatim, everything else uses its compact JSON form
/// (numbers and bools thus keep their natural text, nested values stay
/// inspectable).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
