//! The ledger proper: per-provider usage map plus admission checks.

use super::usage::ProviderUsage;
use super::{AdmissionDecision, UsageSnapshot};
use crate::config::RateLimitConfig;
use crate::window::{MINUTE_MS, now_ms};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct LedgerState {
    limits: HashMap<String, RateLimitConfig>,
    usage: HashMap<String, ProviderUsage>,
}

/// Sliding-window rate limit ledger, shared across every call site.
///
/// All operations are synchronous over in-memory state and return
/// immediately; waiting out a denial is the caller's business. One mutex
/// serializes mutations — admission checks included, since a check purges
/// expired entries — which keeps the cached cost sums consistent under
/// concurrent use. Lock hold times are bounded by the window sizes, which
/// are in turn bounded by realistic rate limits.
///
/// # Examples
///
/// ```
/// use pacer_core::config::RateLimitConfig;
/// use pacer_core::ledger::RateLimitLedger;
///
/// let ledger = RateLimitLedger::new();
/// ledger.set_limits("anthropic", RateLimitConfig::new().with_requests_per_minute(50));
///
/// let decision = ledger.check_admission("anthropic", 1_200);
/// assert!(decision.allowed);
/// ledger.record_usage("anthropic", 1_200);
/// ```
#[derive(Debug, Default)]
pub struct RateLimitLedger {
    state: Mutex<LedgerState>,
}

impl RateLimitLedger {
    /// Create a ledger with no limits configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger from a prebuilt limits table.
    pub fn with_limits(limits: HashMap<String, RateLimitConfig>) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                limits,
                usage: HashMap::new(),
            }),
        }
    }

    /// Create a ledger seeded with bundled presets for the given providers.
    ///
    /// Providers without a preset are left unconfigured (always allowed).
    pub fn with_provider_defaults(providers: &[&str]) -> Self {
        let limits = providers
            .iter()
            .filter_map(|name| {
                RateLimitConfig::for_provider(name).map(|config| (name.to_string(), config))
            })
            .collect();
        Self::with_limits(limits)
    }

    /// Set or replace the limits for one provider.
    pub fn set_limits(&self, provider: impl Into<String>, config: RateLimitConfig) {
        self.state.lock().limits.insert(provider.into(), config);
    }

    /// Configured limits for a provider, if any.
    pub fn limits(&self, provider: &str) -> Option<RateLimitConfig> {
        self.state.lock().limits.get(provider).copied()
    }

    /// Check whether a call of `requested_cost` may proceed now.
    pub fn check_admission(&self, provider: &str, requested_cost: u64) -> AdmissionDecision {
        self.check_admission_at(provider, requested_cost, now_ms())
    }

    /// [`check_admission`](Self::check_admission) against an explicit clock
    /// reading.
    ///
    /// Requests-per-minute is checked before tokens-per-minute; when both
    /// would fail, the request-count reason is reported. A token denial
    /// conservatively waits a full window rather than computing the exact
    /// expiry that would free enough headroom.
    pub fn check_admission_at(
        &self,
        provider: &str,
        requested_cost: u64,
        now_ms: u64,
    ) -> AdmissionDecision {
        let mut state = self.state.lock();
        let LedgerState { limits, usage } = &mut *state;

        let record = usage.entry(provider.to_string()).or_default();
        record.purge_expired(now_ms);

        let Some(config) = limits.get(provider) else {
            return AdmissionDecision::allowed();
        };

        if let Some(rpm) = config.requests_per_minute {
            let used = record.minute_requests();
            if used >= rpm as usize {
                let wait_ms = record
                    .oldest_minute_entry()
                    .map(|entry| entry.expires_in(now_ms, MINUTE_MS))
                    .unwrap_or(0);
                debug!(provider, used, limit = rpm, wait_ms, "admission denied: request limit");
                return AdmissionDecision::denied(
                    wait_ms,
                    format!("requests per minute exhausted ({used}/{rpm})"),
                );
            }
        }

        if let Some(tpm) = config.tokens_per_minute {
            let used = record.minute_cost();
            if used.saturating_add(requested_cost) > tpm {
                debug!(
                    provider,
                    used,
                    requested = requested_cost,
                    limit = tpm,
                    "admission denied: token limit"
                );
                return AdmissionDecision::denied(
                    MINUTE_MS,
                    format!("tokens per minute exhausted ({used} used + {requested_cost} requested > {tpm})"),
                );
            }
        }

        AdmissionDecision::allowed()
    }

    /// Record that an admitted call of `cost` actually happened.
    ///
    /// Recording is never automatic: the caller reports it after the call
    /// was attempted, and must not record calls it abandoned.
    pub fn record_usage(&self, provider: &str, cost: u64) {
        self.record_usage_at(provider, cost, now_ms());
    }

    /// [`record_usage`](Self::record_usage) against an explicit clock reading.
    pub fn record_usage_at(&self, provider: &str, cost: u64, now_ms: u64) {
        let mut state = self.state.lock();
        state
            .usage
            .entry(provider.to_string())
            .or_default()
            .record(now_ms, cost);
    }

    /// Current usage counts for a provider, zeroed when the provider has
    /// never been seen.
    pub fn snapshot(&self, provider: &str) -> UsageSnapshot {
        self.snapshot_at(provider, now_ms())
    }

    /// [`snapshot`](Self::snapshot) against an explicit clock reading.
    pub fn snapshot_at(&self, provider: &str, now_ms: u64) -> UsageSnapshot {
        let mut state = self.state.lock();
        match state.usage.get_mut(provider) {
            Some(record) => {
                record.purge_expired(now_ms);
                record.snapshot()
            }
            None => UsageSnapshot::default(),
        }
    }
}
