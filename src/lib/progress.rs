//! Progress tracking utilities
//!
//! A thread-safe counter that logs progress each time the count crosses an
//! interval boundary. Safe to share between the controller and workers.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::format_count;

/// Thread-safe progress tracker for logging progress at regular intervals.
///
/// # Example
/// ```
/// use seqpool_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Processed records").with_interval(100);
/// for _ in 0..250 {
///     tracker.log_if_needed(1); // Logs at 100, 200
/// }
/// tracker.log_final(); // Logs "Processed records 250 (complete)"
/// ```
pub struct ProgressTracker {
    /// Logging interval; progress is logged when the count crosses a multiple.
    interval: u64,
    /// Message prefix for log output.
    message: String,
    /// Items counted so far.
    count: AtomicU64,
}

impl ProgressTracker {
    /// Create a tracker with the given message prefix and the default
    /// interval of 10,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 10_000, message: message.into(), count: AtomicU64::new(0) }
    }

    /// Set the logging interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Add `additional` items and log once per interval boundary crossed.
    ///
    /// Returns `true` if the new count lands exactly on an interval
    /// boundary, which `log_final` uses to avoid a duplicate line.
    pub fn log_if_needed(&self, additional: u64) -> bool {
        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let count = prev + additional;

        for crossed in (prev / self.interval + 1)..=(count / self.interval) {
            info!("{} {}", self.message, format_count(crossed * self.interval));
        }
        count % self.interval == 0
    }

    /// Log the final count unless it was already logged on a boundary.
    pub fn log_final(&self) {
        let count = self.count.load(Ordering::Relaxed);
        if count % self.interval != 0 {
            info!("{} {} (complete)", self.message, format_count(count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let tracker = ProgressTracker::new("Items").with_interval(100);
        assert!(!tracker.log_if_needed(50));
        assert_eq!(tracker.count(), 50);
        assert!(!tracker.log_if_needed(60)); // 110: crossed 100, not on boundary
        assert!(tracker.log_if_needed(90)); // 200: on boundary
        assert_eq!(tracker.count(), 200);
        tracker.log_final();
    }

    #[test]
    fn test_shared_between_threads() {
        use std::sync::Arc;

        let tracker = Arc::new(ProgressTracker::new("Items").with_interval(1000));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        tracker.log_if_needed(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.count(), 1000);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let tracker = ProgressTracker::new("Items").with_interval(0);
        tracker.log_if_needed(5);
        assert_eq!(tracker.count(), 5);
    }
}
