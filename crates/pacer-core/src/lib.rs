//! Pacer core library.
//!
//! Admission control and retry for outbound calls to third-party AI
//! service providers: a per-provider sliding-window rate limit ledger, a
//! retry policy engine with exponential backoff and `Retry-After` support,
//! and a dispatch loop that ties the two together around a caller-supplied
//! operation. The HTTP transport, endpoint resolution, and payload shaping
//! live in the embedding application; this crate only decides whether a
//! call may proceed and whether a failed one is worth retrying.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod outcome;
pub mod retry;
pub mod window;

// Re-export commonly used types
pub use config::{DEFAULT_RETRYABLE_STATUS, RateLimitConfig, RetryConfig};
pub use dispatch::Dispatcher;
pub use error::{PacerError, PacerResult};
pub use ledger::{AdmissionDecision, ProviderUsage, RateLimitLedger, UsageSnapshot};
pub use outcome::{CallOutcome, NetworkErrorKind};
pub use retry::{RetryPolicy, backoff_delay, parse_retry_after};
pub use window::{DAY_MS, MINUTE_MS, WindowEntry, now_ms};
