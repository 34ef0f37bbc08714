//! Small time and unit helpers.

use std::time::Duration;

/// Elapsed milliseconds between two timestamps; 0 if `since` is in the future.
#[inline]
pub fn elapsed_ms(now_ms: u64, since_ms: u64) -> u64 {
    now_ms.saturating_sub(since_ms)
}

/// Poll interval as a `Duration` (zero means busy-poll).
#[inline]
pub fn poll_interval(us: u64) -> Duration {
    Duration::from_micros(us)
}

/// Convert a raw ADC reading to volts given the full-scale code and reference.
///
/// Uses `(full_scale + 1)` steps, i.e. 1024 for a 10-bit converter.
#[inline]
pub fn raw_to_volts(raw: i32, full_scale: i32, vref: f32) -> f32 {
    let steps = (full_scale.max(0) as f32) + 1.0;
    raw as f32 * vref / steps
}
