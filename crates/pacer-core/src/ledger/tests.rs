//! Tests for the rate limit ledger.

#[cfg(test)]
mod tests {
    use crate::config::RateLimitConfig;
    use crate::ledger::{ProviderUsage, RateLimitLedger};
    use crate::window::MINUTE_MS;
    use std::sync::Arc;

    fn ledger_with(provider: &str, config: RateLimitConfig) -> RateLimitLedger {
        let ledger = RateLimitLedger::new();
        ledger.set_limits(provider, config);
        ledger
    }

    #[test]
    fn purge_keeps_cached_sums_consistent() {
        let mut usage = ProviderUsage::new();
        usage.record(0, 100);
        usage.record(20_000, 200);
        usage.record(50_000, 300);

        // At t=85s the first two minute-entries have aged out.
        usage.purge_expired(85_000);

        for entry in usage.minute_entries() {
            assert!(entry.at_ms > 85_000 - MINUTE_MS);
        }
        let minute_sum: u64 = usage.minute_entries().iter().map(|e| e.cost).sum();
        let day_sum: u64 = usage.day_entries().iter().map(|e| e.cost).sum();
        assert_eq!(usage.minute_cost(), minute_sum);
        assert_eq!(usage.minute_cost(), 300);
        assert_eq!(usage.day_cost(), day_sum);
        assert_eq!(usage.day_cost(), 600);
    }

    #[test]
    fn purge_is_idempotent() {
        let mut usage = ProviderUsage::new();
        usage.record(0, 10);
        usage.record(30_000, 20);

        usage.purge_expired(65_000);
        let once = usage.clone();
        usage.purge_expired(65_000);

        assert_eq!(usage, once);
    }

    #[test]
    fn record_appends_to_both_logs() {
        let mut usage = ProviderUsage::new();
        usage.record(1_000, 42);

        assert_eq!(usage.minute_requests(), 1);
        assert_eq!(usage.day_requests(), 1);
        assert_eq!(usage.minute_cost(), 42);
        assert_eq!(usage.day_cost(), 42);
    }

    #[test]
    fn day_log_outlives_minute_log() {
        let mut usage = ProviderUsage::new();
        usage.record(0, 7);

        usage.purge_expired(120_000);

        assert_eq!(usage.minute_requests(), 0);
        assert_eq!(usage.minute_cost(), 0);
        assert_eq!(usage.day_requests(), 1);
        assert_eq!(usage.day_cost(), 7);
    }

    #[test]
    fn missing_config_degrades_to_allowed() {
        let ledger = RateLimitLedger::new();

        for _ in 0..100 {
            let decision = ledger.check_admission_at("unconfigured", 1_000_000, 0);
            assert!(decision.allowed);
            assert_eq!(decision.wait_ms, 0);
        }
    }

    #[test]
    fn request_limit_denies_at_capacity() {
        let ledger = ledger_with("openai", RateLimitConfig::new().with_requests_per_minute(2));
        ledger.record_usage_at("openai", 0, 0);
        ledger.record_usage_at("openai", 0, 0);

        let denied = ledger.check_admission_at("openai", 0, 0);
        assert!(!denied.allowed);
        assert_eq!(denied.wait_ms, 60_000);
        assert!(denied.reason.as_deref().unwrap().contains("2/2"));

        // Both entries have aged out one millisecond past the window.
        let allowed = ledger.check_admission_at("openai", 0, 61_000);
        assert!(allowed.allowed);
        assert_eq!(allowed.wait_ms, 0);
    }

    #[test]
    fn request_denial_waits_for_oldest_entry() {
        let ledger = ledger_with("openai", RateLimitConfig::new().with_requests_per_minute(2));
        ledger.record_usage_at("openai", 0, 0);
        ledger.record_usage_at("openai", 0, 10_000);

        let denied = ledger.check_admission_at("openai", 0, 30_000);
        assert!(!denied.allowed);
        assert_eq!(denied.wait_ms, 30_000);
    }

    #[test]
    fn token_limit_denies_with_full_window_wait() {
        let ledger = ledger_with("anthropic", RateLimitConfig::new().with_tokens_per_minute(1_000));
        ledger.record_usage_at("anthropic", 900, 0);

        let denied = ledger.check_admission_at("anthropic", 200, 0);
        assert!(!denied.allowed);
        assert_eq!(denied.wait_ms, 60_000);
        assert!(denied.reason.as_deref().unwrap().contains("tokens"));

        let allowed = ledger.check_admission_at("anthropic", 50, 0);
        assert!(allowed.allowed);
    }

    #[test]
    fn token_denial_is_monotonic_in_cost() {
        let ledger = ledger_with("anthropic", RateLimitConfig::new().with_tokens_per_minute(1_000));
        ledger.record_usage_at("anthropic", 900, 0);

        assert!(!ledger.check_admission_at("anthropic", 101, 0).allowed);
        for cost in [102, 500, 10_000, u64::MAX] {
            assert!(!ledger.check_admission_at("anthropic", cost, 0).allowed);
        }
    }

    #[test]
    fn request_limit_reported_before_token_limit() {
        let ledger = ledger_with(
            "openai",
            RateLimitConfig::new()
                .with_requests_per_minute(1)
                .with_tokens_per_minute(100),
        );
        ledger.record_usage_at("openai", 100, 0);

        let denied = ledger.check_admission_at("openai", 100, 0);
        assert!(!denied.allowed);
        assert!(denied.reason.as_deref().unwrap().contains("requests"));
    }

    #[test]
    fn day_limits_are_tracked_but_not_gated() {
        let ledger = ledger_with(
            "openai",
            RateLimitConfig::new()
                .with_requests_per_day(1)
                .with_tokens_per_day(10),
        );
        ledger.record_usage_at("openai", 100, 0);

        // Over both day limits, still admitted.
        assert!(ledger.check_admission_at("openai", 100, 1_000).allowed);

        let snapshot = ledger.snapshot_at("openai", 1_000);
        assert_eq!(snapshot.day_requests, 1);
        assert_eq!(snapshot.day_cost, 100);
    }

    #[test]
    fn snapshot_purges_before_reporting() {
        let ledger = ledger_with("openai", RateLimitConfig::new().with_requests_per_minute(10));
        ledger.record_usage_at("openai", 30, 0);
        ledger.record_usage_at("openai", 40, 50_000);

        let snapshot = ledger.snapshot_at("openai", 70_000);
        assert_eq!(snapshot.minute_requests, 1);
        assert_eq!(snapshot.minute_cost, 40);
        assert_eq!(snapshot.day_requests, 2);
        assert_eq!(snapshot.day_cost, 70);
    }

    #[test]
    fn snapshot_of_unknown_provider_is_zeroed() {
        let ledger = RateLimitLedger::new();
        let snapshot = ledger.snapshot_at("never-seen", 0);
        assert_eq!(snapshot.minute_requests, 0);
        assert_eq!(snapshot.day_cost, 0);
    }

    #[test]
    fn provider_defaults_seed_known_vendors_only() {
        let ledger = RateLimitLedger::with_provider_defaults(&["anthropic", "no-such-vendor"]);

        assert!(ledger.limits("anthropic").is_some());
        assert!(ledger.limits("no-such-vendor").is_none());
    }

    #[test]
    fn concurrent_recording_loses_no_updates() {
        let ledger = Arc::new(ledger_with(
            "openai",
            RateLimitConfig::new().with_tokens_per_minute(1_000_000),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.record_usage_at("openai", 3, 1_000);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = ledger.snapshot_at("openai", 1_000);
        assert_eq!(snapshot.minute_requests, 800);
        assert_eq!(snapshot.minute_cost, 2_400);
    }
}
