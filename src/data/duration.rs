use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Parse duration strings like "1.5s", "500ms", "250µs".
///
/// A bare number is read as seconds, so `--interval 0.5` and
/// `--interval 500ms` mean the same thing.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    let (value, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| s.strip_suffix(suffix).map(|v| (v, *multiplier)))
        .unwrap_or((s, 1_000_000_000.0));

    let val: f64 = match value.trim().parse() {
        Ok(v) => v,
        Err(_) => bail!("Unknown duration format: {}", s),
    };
    if !val.is_finite() || val < 0.0 {
        bail!("Duration must be a non-negative number: {}", s);
    }

    Ok(Duration::from_nanos((val * multiplier) as u64))
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        "0ns".to_string()
    } else if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}µs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.0}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
