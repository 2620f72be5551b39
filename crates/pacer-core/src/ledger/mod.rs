//! Sliding-window rate limit ledger.
//!
//! Tracks request and token consumption per provider over a trailing
//! 1-minute and 24-hour window, and answers admission checks against the
//! configured per-provider limits. All state lives in one in-process
//! structure; nothing is persisted and nothing is coordinated across
//! processes.

mod ledger;
#[cfg(test)]
mod tests;
mod usage;

pub use ledger::RateLimitLedger;
pub use usage::ProviderUsage;

use serde::{Deserialize, Serialize};

/// Result of an admission check.
///
/// A denial is a normal control signal, not an error: `wait_ms` tells the
/// caller how long until the check is worth repeating, and `reason` says
/// which limit fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// Whether the request may proceed now
    pub allowed: bool,
    /// Suggested wait before re-checking (0 when allowed)
    pub wait_ms: u64,
    /// Which limit fired, when denied
    pub reason: Option<String>,
}

impl AdmissionDecision {
    pub(crate) fn allowed() -> Self {
        Self {
            allowed: true,
            wait_ms: 0,
            reason: None,
        }
    }

    pub(crate) fn denied(wait_ms: u64, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            wait_ms,
            reason: Some(reason.into()),
        }
    }
}

/// Point-in-time usage counts for one provider, after expired entries are
/// purged. Day-window figures are reported here even though admission does
/// not gate on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Calls recorded within the trailing minute
    pub minute_requests: usize,
    /// Cost recorded within the trailing minute
    pub minute_cost: u64,
    /// Calls recorded within the trailing day
    pub day_requests: usize,
    /// Cost recorded within the trailing day
    pub day_cost: u64,
}
