//! Dispatch loop tying admission control to the retry policy.
//!
//! The dispatcher runs the control flow around a caller-supplied operation:
//! ask the ledger for admission (waiting out denials), invoke the
//! operation, record consumption on success, and back off and retry on
//! transient failure. The operation is typically an HTTP call made by the
//! collaborating transport layer; the dispatcher itself never touches the
//! network.

use crate::error::{PacerError, PacerResult};
use crate::ledger::RateLimitLedger;
use crate::outcome::CallOutcome;
use crate::retry::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs operations through the ledger and retry policy.
///
/// # Examples
///
/// ```no_run
/// use pacer_core::config::{RateLimitConfig, RetryConfig};
/// use pacer_core::dispatch::Dispatcher;
/// use pacer_core::ledger::RateLimitLedger;
/// use pacer_core::outcome::CallOutcome;
/// use pacer_core::retry::RetryPolicy;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ledger = Arc::new(RateLimitLedger::new());
/// ledger.set_limits("anthropic", RateLimitConfig::new().with_requests_per_minute(50));
///
/// let dispatcher = Dispatcher::new(ledger, RetryPolicy::new(RetryConfig::default()));
/// let reply: String = dispatcher
///     .dispatch("anthropic", 1_200, || async {
///         // Perform the HTTP call here; report how it ended.
///         Err::<String, _>(CallOutcome::status(503))
///     }, None)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    ledger: Arc<RateLimitLedger>,
    policy: RetryPolicy,
    admission_wait_limit: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher over the given ledger and policy.
    pub fn new(ledger: Arc<RateLimitLedger>, policy: RetryPolicy) -> Self {
        Self {
            ledger,
            policy,
            admission_wait_limit: None,
        }
    }

    /// Bound the total time spent waiting out admission denials for one
    /// dispatch. When the bound would be exceeded the dispatch is abandoned
    /// with [`PacerError::Denied`] instead of sleeping.
    pub fn with_admission_wait_limit(mut self, limit: Duration) -> Self {
        self.admission_wait_limit = Some(limit);
        self
    }

    /// The ledger this dispatcher admits against.
    pub fn ledger(&self) -> &RateLimitLedger {
        &self.ledger
    }

    /// The retry policy this dispatcher classifies with.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` against `provider`, charging `cost` on success.
    ///
    /// The operation reports failure as a [`CallOutcome`]; consumption is
    /// recorded only for attempts that succeed. Waits — both admission
    /// denials and retry backoff — are cancellable through the optional
    /// token.
    ///
    /// # Errors
    ///
    /// [`PacerError::Denied`] when the admission wait limit runs out,
    /// [`PacerError::Fatal`] for a non-retryable outcome,
    /// [`PacerError::Exhausted`] when retries run out, and
    /// [`PacerError::Cancelled`] when the token fires during a wait.
    pub async fn dispatch<T, F, Fut>(
        &self,
        provider: &str,
        cost: u64,
        mut operation: F,
        cancel: Option<CancellationToken>,
    ) -> PacerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallOutcome>>,
    {
        let mut attempt: u32 = 0;
        let mut admission_waited = Duration::ZERO;

        loop {
            loop {
                let decision = self.ledger.check_admission(provider, cost);
                if decision.allowed {
                    break;
                }

                let reason = decision.reason.unwrap_or_default();
                let wait = Duration::from_millis(decision.wait_ms);
                if let Some(limit) = self.admission_wait_limit {
                    if admission_waited + wait > limit {
                        return Err(PacerError::denied(provider, decision.wait_ms, reason));
                    }
                }

                warn!(provider, wait_ms = decision.wait_ms, reason = %reason, "admission denied, waiting");
                cancellable_sleep(wait, cancel.as_ref()).await?;
                admission_waited += wait;
            }

            match operation().await {
                Ok(value) => {
                    self.ledger.record_usage(provider, cost);
                    if attempt > 0 {
                        info!(provider, attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(outcome) => {
                    if !self.policy.is_transient(&outcome) {
                        warn!(provider, error = %outcome, "non-retryable failure");
                        return Err(PacerError::Fatal {
                            provider: provider.to_string(),
                            outcome,
                        });
                    }
                    if attempt >= self.policy.config().max_retries {
                        warn!(provider, attempts = attempt + 1, "retries exhausted");
                        return Err(PacerError::Exhausted {
                            provider: provider.to_string(),
                            attempts: attempt + 1,
                            last: outcome,
                        });
                    }

                    let delay = self.policy.next_delay(&outcome, attempt);
                    warn!(
                        provider,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %outcome,
                        "transient failure, backing off"
                    );
                    cancellable_sleep(delay, cancel.as_ref()).await?;
                    attempt += 1;
                }
            }
        }
    }
}

async fn cancellable_sleep(delay: Duration, cancel: Option<&CancellationToken>) -> PacerResult<()> {
    match cancel {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => Err(PacerError::Cancelled),
                _ = sleep(delay) => Ok(()),
            }
        }
        None => {
            sleep(delay).await;
            Ok(())
        }
    }
}
