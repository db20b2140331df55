//! Timestamp format heuristics for the event-time field.

use chrono::DateTime;
use serde_json::Value;

/// The timeFormat values pantherlog understands.
pub const TIME_FORMATS: [&str; 5] = ["rfc3339", "unix", "unix_ms", "unix_us", "unix_ns"];

/// Fallback when the observed values give no usable signal.
pub const DEFAULT_TIME_FORMAT: &str = "rfc3339";

/// Guess the timeFormat from observed event-time values.
///
/// First value with a usable shape wins: a string that parses as RFC 3339
/// means `rfc3339`; an integer is an epoch, classed by magnitude.
pub fn guess_format(values: &[Value]) -> &'static str {
    for value in values {
        match value {
            Value::String(s) if looks_like_rfc3339(s) => return "rfc3339",
            Value::Number(n) => {
                if let Some(epoch) = n.as_i64() {
                    return classify_epoch(epoch);
                }
            }
            _ => {}
        }
    }
    DEFAULT_TIME_FORMAT
}

pub fn looks_like_rfc3339(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

/// Magnitude classes: seconds fit in 11 digits until the year 5138; each
/// coarser class is a factor of 1000 up from there.
fn classify_epoch(epoch: i64) -> &'static str {
    let magnitude = epoch.unsigned_abs();
    if magnitude < 100_000_000_000 {
        "unix"
    } else if magnitude < 100_000_000_000_000 {
        "unix_ms"
    } else if magnitude < 100_000_000_000_000_000 {
        "unix_us"
    } else {
        "unix_ns"
    }
}
