//! Shared time and window utilities for sliding-window accounting.

use serde::{Deserialize, Serialize};

/// One minute, in milliseconds.
pub const MINUTE_MS: u64 = 60_000;

/// One day, in milliseconds.
pub const DAY_MS: u64 = 86_400_000;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A single recorded call inside a usage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    /// When the call was recorded, in epoch milliseconds.
    pub at_ms: u64,
    /// Cost charged for the call (token count, or 0 for pure request counting).
    pub cost: u64,
}

impl WindowEntry {
    /// Create an entry recorded at `at_ms` with the given cost.
    pub fn new(at_ms: u64, cost: u64) -> Self {
        Self { at_ms, cost }
    }

    /// True when the entry has aged out of a window ending at `now_ms`.
    ///
    /// An entry recorded exactly one window ago is already expired.
    pub fn expired(&self, now_ms: u64, window_ms: u64) -> bool {
        self.at_ms <= now_ms.saturating_sub(window_ms)
    }

    /// Milliseconds until this entry ages out of a window ending at `now_ms`.
    ///
    /// Floored at zero for entries that have already expired.
    pub fn expires_in(&self, now_ms: u64, window_ms: u64) -> u64 {
        window_ms.saturating_sub(now_ms.saturating_sub(self.at_ms))
    }
}
