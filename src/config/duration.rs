//! Duration strings in the `1m30s` / `500ms` / `1.5s` form.

use regex::Regex;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration \"{0}\" (expected e.g. 500ms, 5s, 1m30s)")]
    Invalid(String),
    #[error("duration pattern failed to compile: {0}")]
    Pattern(String),
}

const COMPONENT: &str = r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|ms|s|m|h)";

/// Parse a sequence of decimal numbers with unit suffixes. A bare `0` is
/// accepted as zero; signs are not.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let whole = Regex::new(&format!("^(?:{COMPONENT})+$"))
        .map_err(|e| DurationParseError::Pattern(e.to_string()))?;
    if !whole.is_match(input) {
        return Err(DurationParseError::Invalid(input.to_string()));
    }

    let component =
        Regex::new(COMPONENT).map_err(|e| DurationParseError::Pattern(e.to_string()))?;
    let mut total_nanos: f64 = 0.0;
    for caps in component.captures_iter(input) {
        let value: f64 = caps[1]
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;
        let unit_nanos = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            _ => 3600.0 * 1e9,
        };
        total_nanos += value * unit_nanos;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(DurationParseError::Invalid(input.to_string()));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Render a duration the way [`parse_duration`] reads it back
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }

    let secs = millis / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 {
        out.push_str(&format!("{seconds}s"));
    }
    out
}
