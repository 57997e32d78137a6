//! Collision-chain monitoring.
//!
//! Every lookup reports how many nodes (or slots) it visited. Chains longer than the
//! configured threshold are passed to a diagnostic callback, or logged when no callback
//! is installed. Long chains never fail an operation.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Details handed to the collision callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionReport {
    /// Nodes or slots visited by the lookup that crossed the threshold
    pub chain_length: usize,
    /// Configured threshold
    pub threshold: usize,
    /// Reports raised so far, including this one
    pub total_reports: u64,
}

/// Callback invoked when a lookup walks a chain longer than the threshold.
pub type CollisionCallback = Arc<dyn Fn(&CollisionReport) + Send + Sync>;

/// Aggregate counters collected by a [`CollisionMonitor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Lookups recorded
    pub lookups: u64,
    /// Total nodes or slots visited across all lookups
    pub probes: u64,
    /// Longest chain seen
    pub longest_chain: usize,
    /// Lookups that crossed the threshold
    pub reports: u64,
}

/// Thread-safe chain-length counter with a threshold callback.
pub struct CollisionMonitor {
    threshold: usize,
    callback: Option<CollisionCallback>,
    lookups: AtomicU64,
    probes: AtomicU64,
    longest: AtomicUsize,
    reports: AtomicU64,
}

impl CollisionMonitor {
    /// Creates a monitor reporting chains longer than `threshold`.
    pub fn new(threshold: usize, callback: Option<CollisionCallback>) -> Self {
        Self {
            threshold,
            callback,
            lookups: AtomicU64::new(0),
            probes: AtomicU64::new(0),
            longest: AtomicUsize::new(0),
            reports: AtomicU64::new(0),
        }
    }

    /// Threshold above which chains are reported.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Records one lookup that visited `chain_length` nodes.
    pub fn record(&self, chain_length: usize) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.probes.fetch_add(chain_length as u64, Ordering::Relaxed);
        self.longest.fetch_max(chain_length, Ordering::Relaxed);

        if chain_length <= self.threshold {
            return;
        }

        let report = CollisionReport {
            chain_length,
            threshold: self.threshold,
            total_reports: self.reports.fetch_add(1, Ordering::Relaxed) + 1,
        };
        match &self.callback {
            Some(callback) => callback(&report),
            None => tracing::warn!(
                chain_length = report.chain_length,
                threshold = report.threshold,
                total_reports = report.total_reports,
                "Collision chain exceeded threshold"
            ),
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CollisionStats {
        CollisionStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            longest_chain: self.longest.load(Ordering::Relaxed),
            reports: self.reports.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for CollisionMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionMonitor")
            .field("threshold", &self.threshold)
            .field("has_callback", &self.callback.is_some())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_monitor_counts_every_lookup() {
        let monitor = CollisionMonitor::new(4, None);
        monitor.record(1);
        monitor.record(3);
        monitor.record(2);

        let stats = monitor.stats();
        assert_eq!(stats.lookups, 3);
        assert_eq!(stats.probes, 6);
        assert_eq!(stats.longest_chain, 3);
        assert_eq!(stats.reports, 0);
    }

    #[test]
    fn test_monitor_invokes_callback_past_threshold() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: CollisionCallback = Arc::new(move |report: &CollisionReport| {
            sink.lock().push(*report);
        });
        let monitor = CollisionMonitor::new(2, Some(callback));

        monitor.record(2);
        monitor.record(3);
        monitor.record(7);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].chain_length, 3);
        assert_eq!(seen[1].total_reports, 2);
        assert_eq!(monitor.stats().reports, 2);
    }
}
