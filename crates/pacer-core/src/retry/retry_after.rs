//! Parsing of the `Retry-After` response header.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Parse a `Retry-After` header into a delay.
///
/// Tries the delta-seconds form first, then the HTTP-date form measured
/// against the current wall clock (floored at zero for dates already in
/// the past). Returns `None` when the header is absent or unparseable.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    parse_retry_after_at(headers, Utc::now())
}

/// [`parse_retry_after`] against an explicit clock reading.
pub fn parse_retry_after_at(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta_ms = date
        .with_timezone(&Utc)
        .signed_duration_since(now)
        .num_milliseconds();
    Some(Duration::from_millis(delta_ms.max(0) as u64))
}
