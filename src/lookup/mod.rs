//! Nearest-match retrieval over a pace table.
//!
//! The match column of an external table does not describe its own unit:
//! depending on who exported it, a 5k time may be stored as `"19:30"`, as
//! `1170` seconds, or as `19.5` minutes. Rather than guessing per row
//! (which misclassifies borderline values), the storage convention is
//! inferred once per dataset access from a bounded sample and applied
//! uniformly; the per-value magnitude heuristic is only the fallback when
//! no convention could be established.

use serde_json::Value;
use tracing::debug;

use crate::normalize::{parse_clock, parse_stored_time, parse_time_to_seconds, SECONDS_THRESHOLD};

/// A candidate row: opaque field-name-to-value mapping from the row source.
///
/// Only the match field is inspected here; everything else passes through
/// untouched for the caller to present.
pub type Row = serde_json::Map<String, Value>;

/// How many non-null values to sample when inferring the convention.
pub const CONVENTION_SAMPLE_SIZE: usize = 20;

/// Dataset-wide encoding of the match column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageConvention {
    /// Colon-delimited clock strings (`"19:30"`, `"1:02:15"`).
    Clock,
    /// Bare numbers already in seconds.
    Seconds,
    /// Bare numbers in minutes.
    Minutes,
    /// Nothing usable in the sample; fall back to per-value inference.
    Unknown,
}

/// Infer the storage convention from a sample of non-null column values.
///
/// Any colon string in the sample decides `Clock`. Otherwise every value is
/// parsed as a float (failures discarded) and the median magnitude decides
/// seconds vs. minutes. The median is robust to a few outliers in the
/// sample; for an even-length list the lower-middle element is used.
pub fn detect_convention(sample: &[&Value]) -> StorageConvention {
    if sample.is_empty() {
        return StorageConvention::Unknown;
    }

    if sample
        .iter()
        .any(|v| v.as_str().is_some_and(|s| s.contains(':')))
    {
        return StorageConvention::Clock;
    }

    let mut parsed: Vec<f64> = sample.iter().filter_map(|v| value_as_f64(v)).collect();
    if parsed.is_empty() {
        return StorageConvention::Unknown;
    }

    parsed.sort_by(|a, b| a.total_cmp(b));
    let median = parsed[parsed.len() / 2];
    if median >= SECONDS_THRESHOLD {
        StorageConvention::Seconds
    } else {
        StorageConvention::Minutes
    }
}

/// Cast a JSON scalar to `f64`, accepting numeric strings.
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize one stored value to seconds under a known convention.
///
/// A cast or parse failure excludes the row rather than falling back: the
/// fallback heuristic is reserved for the `Unknown` convention.
fn normalize_with_convention(value: &Value, convention: StorageConvention) -> Option<f64> {
    match convention {
        StorageConvention::Clock => {
            let s = value.as_str()?;
            if !s.contains(':') {
                return None;
            }
            parse_clock(s)
        }
        StorageConvention::Seconds => value_as_f64(value),
        StorageConvention::Minutes => value_as_f64(value).map(|m| m * 60.0),
        StorageConvention::Unknown => parse_stored_time(value),
    }
}

/// Find the row whose `match_field` time is closest to the raw query.
///
/// The query goes through the free-text grammar; an unparsable query means
/// no lookup is possible. Rows with a missing or null match field never
/// enter the scan, and a row whose value fails to normalize is skipped
/// without aborting. Strict `<` on the distance makes the first row among
/// exact ties win, so repeated calls over an unchanged dataset return the
/// same row.
pub fn find_closest<'a>(target_raw: &str, rows: &'a [Row], match_field: &str) -> Option<&'a Row> {
    let target_seconds = parse_time_to_seconds(target_raw)?;

    let sample: Vec<&Value> = rows
        .iter()
        .filter_map(|row| row.get(match_field))
        .filter(|v| !v.is_null())
        .take(CONVENTION_SAMPLE_SIZE)
        .collect();
    let convention = detect_convention(&sample);
    debug!(
        field = match_field,
        ?convention,
        rows = rows.len(),
        "scanning for nearest match"
    );

    let mut best_distance = f64::INFINITY;
    let mut best_row: Option<&Row> = None;

    for row in rows {
        let raw = match row.get(match_field) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        let Some(seconds) = normalize_with_convention(raw, convention) else {
            continue;
        };
        let distance = (seconds - target_seconds).abs();
        if distance < best_distance {
            best_distance = distance;
            best_row = Some(row);
        }
    }

    best_row
}
