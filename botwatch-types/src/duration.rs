//! Human-friendly duration strings ("500ms", "2s", "1.5m").

use core::time::Duration;

use thiserror::Error;

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

/// A duration string that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown duration format: {0}")]
pub struct DurationParseError(pub String);

/// Parse duration strings like "15s", "988.82ms", "16.958µs", "0ns".
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str
                .trim()
                .parse()
                .map_err(|_| DurationParseError(s.to_string()))?;
            if !val.is_finite() || val < 0.0 {
                return Err(DurationParseError(s.to_string()));
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    Err(DurationParseError(s.to_string()))
}
