//! Admission control and retry toolkit for multi-provider AI API clients.
//!
//! Facade over [`pacer_core`]: before issuing a call, ask the
//! [`RateLimitLedger`] whether it is admissible; perform the call in your
//! own transport; report consumption back on success, or consult the
//! [`RetryPolicy`] for a backoff delay on failure. The [`Dispatcher`] wraps
//! that loop for callers that want it handled.

pub use pacer_core::*;
