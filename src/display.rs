//! Formatting helpers for controller view models

use chrono::{TimeZone, Utc};

/// Render a backend-reported query duration in milliseconds.
///
/// 500_000 ns displays as `0.5ms`.
pub fn format_query_time(ns: i64) -> String {
    format!("{}ms", ns as f64 / 1_000_000.0)
}

/// Render a nanosecond epoch timestamp as a UTC wall-clock string.
pub fn format_time_ns(ns: i64) -> String {
    Utc.timestamp_nanos(ns)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}
