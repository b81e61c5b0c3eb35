//! Storage codec: lossless key and timestamp escaping
//!
//! The physical store forbids mapping keys that start with `$` or contain
//! `.`, and has no date type that survives round-trips. The codec rewrites
//! documents at the storage boundary so that in-memory documents stay
//! unrestricted:
//!
//! - a leading `$` becomes [`DOLLAR_ESCAPE`]
//! - every `.` becomes [`DOT_ESCAPE`]
//! - [`Value::Timestamp`] becomes a `DT_`-tagged string in a fixed-width
//!   UTC format, so lexicographic order of encoded stamps agrees with
//!   chronological order (the schedule due-query and the lock reaper both
//!   compare encoded stamps as strings)
//!
//! Round-trip law: `decode(encode(v)) == v` for every value whose keys do
//! not already contain the escape tokens verbatim. Empty keys and nulls
//! pass through unchanged.

use chrono::{DateTime, NaiveDateTime, Utc};
use flowstore_core::Value;

/// Replaces a leading `$` in a stored key.
pub const DOLLAR_ESCAPE: &str = "~#~";

/// Replaces every `.` in a stored key.
pub const DOT_ESCAPE: &str = "~*~";

/// Tag in front of every encoded timestamp string.
pub const TIMESTAMP_PREFIX: &str = "DT_";

// Fixed-width: millisecond precision is always printed, so encoded stamps
// of equal length compare lexicographically in chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render a timestamp in the encoded wire form, `DT_` tag included.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    format!("{}{}", TIMESTAMP_PREFIX, t.format(TIMESTAMP_FORMAT))
}

/// Parse a wire-form timestamp back into a UTC instant.
///
/// Returns `None` when the string is not tagged or does not match the
/// fixed format; callers treat such strings as plain strings.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let rest = s.strip_prefix(TIMESTAMP_PREFIX)?;
    NaiveDateTime::parse_from_str(rest, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Rewrite an in-memory value into its storable form.
///
/// Applied before every physical write. Recurses through mappings and
/// sequences; scalars other than timestamps pass through untouched.
pub fn encode(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (encode_key(&k), encode(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(encode).collect()),
        Value::Timestamp(t) => Value::String(format_timestamp(t)),
        other => other,
    }
}

/// Exact inverse of [`encode`]. Applied after every physical read.
pub fn decode(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (decode_key(&k), decode(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(decode).collect()),
        Value::String(s) => match parse_timestamp(&s) {
            Some(t) => Value::Timestamp(t),
            None => Value::String(s),
        },
        other => other,
    }
}

fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let key = key.replace('.', DOT_ESCAPE);
    match key.strip_prefix('$') {
        Some(rest) => format!("{}{}", DOLLAR_ESCAPE, rest),
        None => key,
    }
}

fn decode_key(key: &str) -> String {
    let key = match key.strip_prefix(DOLLAR_ESCAPE) {
        Some(rest) => format!("${}", rest),
        None => key.to_string(),
    };
    key.replace(DOT_ESCAPE, ".")
}
