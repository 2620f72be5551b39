//! Retryability classification and delay selection.

use super::backoff::backoff_delay;
use crate::config::RetryConfig;
use crate::outcome::CallOutcome;
use std::time::Duration;

/// Decides whether a failed attempt is worth retrying and what delay to
/// apply before the next one.
///
/// Classification never raises: a non-retryable outcome is ordinary
/// decision data, surfaced to the caller as-is.
///
/// # Examples
///
/// ```
/// use pacer_core::config::RetryConfig;
/// use pacer_core::outcome::CallOutcome;
/// use pacer_core::retry::RetryPolicy;
///
/// let policy = RetryPolicy::new(RetryConfig::default());
/// assert!(policy.is_retryable(&CallOutcome::status(503), 0));
/// assert!(!policy.is_retryable(&CallOutcome::status(401), 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Whether the outcome's failure class is transient, independent of the
    /// attempt count.
    ///
    /// Transient means: a status code in the retryable set, a network error
    /// class in the retryable set, or a diagnostic message indicating a
    /// timeout. Everything else is fatal to the attempt chain.
    pub fn is_transient(&self, outcome: &CallOutcome) -> bool {
        if let Some(status) = outcome.status {
            if self.config.retryable_status.contains(&status) {
                return true;
            }
        }
        if let Some(kind) = outcome.network_error {
            if self.config.retryable_network.contains(&kind) {
                return true;
            }
        }
        outcome.mentions_timeout()
    }

    /// Whether attempt number `attempt` (0-indexed) should be retried after
    /// the given outcome. Always false once `attempt` reaches the
    /// configured maximum.
    pub fn is_retryable(&self, outcome: &CallOutcome, attempt: u32) -> bool {
        attempt < self.config.max_retries && self.is_transient(outcome)
    }

    /// Jittered exponential backoff delay for the given attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        backoff_delay(
            attempt,
            self.config.base_delay,
            self.config.max_delay,
            self.config.backoff_multiplier,
        )
    }

    /// Delay before the next attempt: the server's retry hint when the
    /// outcome carries one (the hint is authoritative), otherwise the
    /// computed backoff.
    pub fn next_delay(&self, outcome: &CallOutcome, attempt: u32) -> Duration {
        outcome
            .retry_after
            .unwrap_or_else(|| self.backoff_delay(attempt))
    }
}
