//! Display formatting for stats values.
//!
//! Every formatter takes an `Option` and renders [`PLACEHOLDER`] when the
//! collector left the field out.

use chrono::{DateTime, Local, TimeZone};

/// Shown in place of a missing value.
pub const PLACEHOLDER: &str = "-";

/// Format a float with a fixed number of decimal places.
pub fn format_fixed(value: f64, places: usize) -> String {
    format!("{:.*}", places, value)
}

/// Throughput in messages per second, two decimals.
pub fn format_throughput(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format_fixed(v, 2))
}

/// Progress percentage, one decimal with a `%` suffix.
pub fn format_progress(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{}%", format_fixed(v, 1)))
}

/// Elapsed seconds, one decimal with an `s` suffix.
pub fn format_elapsed(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{}s", format_fixed(v, 1)))
}

/// Integer counter.
pub fn format_count(value: Option<u64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Free text such as a bot id, topic or address.
pub fn format_text(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format a Unix timestamp (seconds) as a local `HH:MM:SS` label.
pub fn format_time_label(timestamp: f64) -> String {
    format_time_label_in(timestamp, &Local)
}

/// Format a Unix timestamp (seconds) as `HH:MM:SS` in the given zone.
pub fn format_time_label_in<Tz>(timestamp: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !timestamp.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M:%S").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}
