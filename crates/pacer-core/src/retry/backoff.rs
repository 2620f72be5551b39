//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Symmetric jitter applied to every computed delay, as a fraction of it.
const JITTER_RATIO: f64 = 0.25;

/// Delay before retry number `attempt` (0-indexed).
///
/// The exponential `base * multiplier^attempt` gets ±25% jitter and the
/// result is clamped into `[0, max_delay]`. The cap is applied after
/// jitter, so once the exponential has overshot the cap the returned delay
/// sits exactly at `max_delay` rather than jittering below it.
pub fn backoff_delay(
    attempt: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
) -> Duration {
    let max_ms = max_delay.as_millis() as f64;
    // Bounding the exponential at twice the cap keeps the arithmetic finite
    // for large attempt counts without changing the clamped result.
    let raw_ms = (base_delay.as_millis() as f64 * multiplier.powi(attempt as i32)).min(max_ms * 2.0);

    let jitter_bound = raw_ms * JITTER_RATIO;
    let jittered = raw_ms + rand::thread_rng().gen_range(-jitter_bound..=jitter_bound);

    Duration::from_millis(jittered.clamp(0.0, max_ms).round() as u64)
}
