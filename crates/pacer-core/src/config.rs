//! Configuration for rate limiting and retry behavior.
//!
//! Limits are supplied programmatically by the embedding application, per
//! provider. All limit fields are optional; `None` means the dimension is
//! not limited. Only the minute-window fields gate admission — the
//! day-window fields are tracked for observability and surfaced through
//! usage snapshots.

use crate::error::{PacerError, PacerResult};
use crate::outcome::NetworkErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP status codes retried by default: 429, the common transient 5xx,
/// and the Cloudflare-specific 52x family.
pub const DEFAULT_RETRYABLE_STATUS: [u16; 9] = [429, 500, 502, 503, 504, 520, 521, 522, 524];

/// Per-provider rate limit configuration.
///
/// # Examples
///
/// ```
/// use pacer_core::config::RateLimitConfig;
///
/// let limits = RateLimitConfig::new()
///     .with_requests_per_minute(60)
///     .with_tokens_per_minute(100_000);
/// assert!(!limits.is_unlimited());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per minute
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    /// Maximum tokens per minute
    #[serde(default)]
    pub tokens_per_minute: Option<u64>,

    /// Maximum requests per day (tracked, not gated)
    #[serde(default)]
    pub requests_per_day: Option<u32>,

    /// Maximum tokens per day (tracked, not gated)
    #[serde(default)]
    pub tokens_per_day: Option<u64>,
}

impl RateLimitConfig {
    /// Create an empty (unlimited) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set requests per minute
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }

    /// Set tokens per minute
    pub fn with_tokens_per_minute(mut self, tpm: u64) -> Self {
        self.tokens_per_minute = Some(tpm);
        self
    }

    /// Set requests per day
    pub fn with_requests_per_day(mut self, rpd: u32) -> Self {
        self.requests_per_day = Some(rpd);
        self
    }

    /// Set tokens per day
    pub fn with_tokens_per_day(mut self, tpd: u64) -> Self {
        self.tokens_per_day = Some(tpd);
        self
    }

    /// True when no dimension is limited.
    pub fn is_unlimited(&self) -> bool {
        self.requests_per_minute.is_none()
            && self.tokens_per_minute.is_none()
            && self.requests_per_day.is_none()
            && self.tokens_per_day.is_none()
    }

    /// Conservative default limits for a well-known provider.
    ///
    /// Returns `None` for providers without a bundled preset; admission
    /// degrades to always-allowed until the caller supplies limits.
    pub fn for_provider(provider: &str) -> Option<Self> {
        match provider.to_lowercase().as_str() {
            // OpenAI: varies by tier, use conservative defaults
            "openai" => Some(Self::new().with_requests_per_minute(60).with_tokens_per_minute(100_000)),
            // Anthropic: 50 RPM for Claude models
            "anthropic" => Some(Self::new().with_requests_per_minute(50).with_tokens_per_minute(80_000)),
            // Google: 60 RPM for Gemini
            "google" | "gemini" => {
                Some(Self::new().with_requests_per_minute(60).with_tokens_per_minute(120_000))
            }
            // OpenRouter: aggregates multiple providers
            "openrouter" => Some(Self::new().with_requests_per_minute(60).with_tokens_per_minute(100_000)),
            // Mistral: conservative defaults
            "mistral" => Some(Self::new().with_requests_per_minute(60).with_tokens_per_minute(100_000)),
            // Groq: generous request rate, tight token budget
            "groq" => Some(Self::new().with_requests_per_minute(30).with_tokens_per_minute(30_000)),
            // Ollama: local, requests only
            "ollama" => Some(Self::new().with_requests_per_minute(120)),
            _ => None,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retryable_status() -> Vec<u16> {
    DEFAULT_RETRYABLE_STATUS.to_vec()
}

fn default_retryable_network() -> Vec<NetworkErrorKind> {
    vec![
        NetworkErrorKind::ConnectionReset,
        NetworkErrorKind::ConnectionRefused,
        NetworkErrorKind::Timeout,
        NetworkErrorKind::DnsFailure,
        NetworkErrorKind::TemporaryDnsFailure,
    ]
}

/// Process-wide retry behavior configuration.
///
/// # Examples
///
/// ```
/// use pacer_core::config::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_max_retries(5)
///     .with_base_delay(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(10));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,

    /// Upper bound on any computed delay
    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// HTTP status codes considered transient
    #[serde(default = "default_retryable_status")]
    pub retryable_status: Vec<u16>,

    /// Network error classes considered transient
    #[serde(default = "default_retryable_network")]
    pub retryable_network: Vec<NetworkErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            retryable_status: default_retryable_status(),
            retryable_network: default_retryable_network(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set max retries
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the delay before the first retry
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Replace the retryable status code set
    pub fn with_retryable_status(mut self, status: Vec<u16>) -> Self {
        self.retryable_status = status;
        self
    }

    /// Replace the retryable network error set
    pub fn with_retryable_network(mut self, kinds: Vec<NetworkErrorKind>) -> Self {
        self.retryable_network = kinds;
        self
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the multiplier would shrink delays
    /// or `base_delay` exceeds `max_delay`.
    pub fn validate(&self) -> PacerResult<()> {
        if self.backoff_multiplier < 1.0 || !self.backoff_multiplier.is_finite() {
            return Err(PacerError::config(format!(
                "backoff multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.base_delay > self.max_delay {
            return Err(PacerError::config(format!(
                "base delay {:?} exceeds max delay {:?}",
                self.base_delay, self.max_delay
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_by_default() {
        assert!(RateLimitConfig::default().is_unlimited());
        assert!(!RateLimitConfig::new().with_requests_per_minute(1).is_unlimited());
    }

    #[test]
    fn provider_presets() {
        let anthropic = RateLimitConfig::for_provider("Anthropic").unwrap();
        assert_eq!(anthropic.requests_per_minute, Some(50));

        let ollama = RateLimitConfig::for_provider("ollama").unwrap();
        assert_eq!(ollama.tokens_per_minute, None);

        assert!(RateLimitConfig::for_provider("unknown-vendor").is_none());
    }

    #[test]
    fn retry_config_validation() {
        assert!(RetryConfig::default().validate().is_ok());

        let shrinking = RetryConfig::default().with_backoff_multiplier(0.5);
        assert!(shrinking.validate().is_err());

        let inverted = RetryConfig::default()
            .with_base_delay(Duration::from_secs(60))
            .with_max_delay(Duration::from_secs(1));
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn retry_config_round_trips_through_serde() {
        let config = RetryConfig::default().with_max_retries(7);
        let json = serde_json::to_string(&config).unwrap();
        let back: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_retries, 7);
        assert_eq!(back.base_delay, config.base_delay);
    }

    #[test]
    fn default_status_set_covers_cloudflare_range() {
        for status in [429, 500, 502, 503, 504, 520, 521, 522, 524] {
            assert!(DEFAULT_RETRYABLE_STATUS.contains(&status));
        }
        assert!(!DEFAULT_RETRYABLE_STATUS.contains(&523));
    }
}
