//! Lenient readers over raw JSON settings.
//!
//! Settings arrive from remote definitions and hand-written files. A missing,
//! empty or mistyped key reads as unset; none of these readers fail.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

/// ISO calendar date format used for date settings and date record values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn read_i64(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(as_i64)
}

pub(crate) fn read_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(as_f64)
}

pub(crate) fn read_bool(map: &Map<String, Value>, key: &str) -> bool {
    matches!(map.get(key), Some(Value::Bool(true)))
}

pub(crate) fn read_date(map: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    match map.get(key) {
        Some(Value::String(s)) => parse_date(s),
        _ => None,
    }
}

/// Whole number view of a JSON value. Accepts integral floats and numeric strings.
///
/// Values outside the `i64` range read as unset.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Numeric view of a JSON value. Accepts numeric strings.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
