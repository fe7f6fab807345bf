//! Race-time normalization.
//!
//! Converts the heterogeneous time representations that show up in user
//! input and stored pace tables into a single comparable unit: elapsed
//! seconds as `f64`. Two entry points exist because the two call sites have
//! different semantics: a human typing a query never enters a 5k time as
//! raw seconds, whereas a stored column may hold either unit.

use serde_json::Value;

/// Numeric values at or above this are assumed to already be seconds.
///
/// Typical 5k times are 800-3600 seconds or 13-60 minutes, so 100 cleanly
/// separates the two. Tied to the 5k distance; other distances would need
/// a different threshold.
pub const SECONDS_THRESHOLD: f64 = 100.0;

/// Parse a free-form query string into seconds.
///
/// Accepted formats: `"25"` or `"25.5"` (minutes), `"mm:ss"`, `"hh:mm:ss"`.
/// Returns `None` for empty or unparsable input.
pub fn parse_time_to_seconds(value: &str) -> Option<f64> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if s.contains(':') {
        return parse_clock(s);
    }

    // No colon: treat as minutes (fractional allowed)
    let minutes: f64 = s.parse().ok()?;
    Some(minutes * 60.0)
}

/// Parse a colon-delimited clock string (`mm:ss` or `hh:mm:ss`) into seconds.
///
/// Any other segment count, or a segment that is not a number, yields `None`.
pub fn parse_clock(s: &str) -> Option<f64> {
    let parts: Result<Vec<f64>, _> = s.split(':').map(|p| p.parse::<f64>()).collect();
    let parts = parts.ok()?;

    match parts.as_slice() {
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => None,
    }
}

/// Normalize a stored match-field value whose unit is not self-describing.
///
/// Strings follow the query grammar (colon forms, else minutes). Bare
/// numbers get the magnitude heuristic: at or above [`SECONDS_THRESHOLD`]
/// they are taken as seconds, below it as minutes. Null and non-scalar
/// values yield `None`.
pub fn parse_stored_time(raw: &Value) -> Option<f64> {
    match raw {
        Value::Null => None,
        Value::String(s) => {
            if s.contains(':') {
                parse_clock(s)
            } else {
                let minutes: f64 = s.parse().ok()?;
                Some(minutes * 60.0)
            }
        }
        Value::Number(n) => {
            let number = n.as_f64()?;
            if number >= SECONDS_THRESHOLD {
                Some(number)
            } else {
                Some(number * 60.0)
            }
        }
        _ => None,
    }
}
