//! Per-provider usage logs.

use super::UsageSnapshot;
use crate::window::{DAY_MS, MINUTE_MS, WindowEntry};
use std::collections::VecDeque;

/// Sliding-window usage record for one provider.
///
/// Two independent logs, both appended on every recorded call: one trimmed
/// to the trailing minute, one to the trailing day. The cached cost sums
/// always equal the sum of their log's entries; every mutation re-establishes
/// that invariant. Expired entries are dropped lazily before any check or
/// mutation, never on a timer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderUsage {
    minute_entries: VecDeque<WindowEntry>,
    day_entries: VecDeque<WindowEntry>,
    minute_cost: u64,
    day_cost: u64,
}

impl ProviderUsage {
    /// Create an empty usage record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries that have aged out of their window as of `now_ms` and
    /// keep the cached sums in step. Idempotent: purging an already-purged
    /// record is a no-op.
    pub fn purge_expired(&mut self, now_ms: u64) {
        while let Some(front) = self.minute_entries.front() {
            if front.expired(now_ms, MINUTE_MS) {
                self.minute_cost -= front.cost;
                self.minute_entries.pop_front();
            } else {
                break;
            }
        }

        while let Some(front) = self.day_entries.front() {
            if front.expired(now_ms, DAY_MS) {
                self.day_cost -= front.cost;
                self.day_entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record one call of the given cost at `now_ms` in both logs.
    pub fn record(&mut self, now_ms: u64, cost: u64) {
        self.purge_expired(now_ms);

        let entry = WindowEntry::new(now_ms, cost);
        self.minute_entries.push_back(entry);
        self.day_entries.push_back(entry);
        self.minute_cost += cost;
        self.day_cost += cost;
    }

    /// Number of calls in the trailing minute.
    pub fn minute_requests(&self) -> usize {
        self.minute_entries.len()
    }

    /// Summed cost over the trailing minute.
    pub fn minute_cost(&self) -> u64 {
        self.minute_cost
    }

    /// Number of calls in the trailing day.
    pub fn day_requests(&self) -> usize {
        self.day_entries.len()
    }

    /// Summed cost over the trailing day.
    pub fn day_cost(&self) -> u64 {
        self.day_cost
    }

    /// Oldest call still inside the minute window.
    pub(crate) fn oldest_minute_entry(&self) -> Option<&WindowEntry> {
        self.minute_entries.front()
    }

    pub(crate) fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            minute_requests: self.minute_entries.len(),
            minute_cost: self.minute_cost,
            day_requests: self.day_entries.len(),
            day_cost: self.day_cost,
        }
    }

    #[cfg(test)]
    pub(crate) fn minute_entries(&self) -> &VecDeque<WindowEntry> {
        &self.minute_entries
    }

    #[cfg(test)]
    pub(crate) fn day_entries(&self) -> &VecDeque<WindowEntry> {
        &self.day_entries
    }
}
