//! Conversions between chrono durations and fractional days.

use chrono::Duration;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Length of a duration in fractional days.
pub fn duration_to_days(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Duration spanning `days` fractional days, at millisecond precision.
pub fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}
