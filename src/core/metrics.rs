//! Logger metrics for observability
//!
//! Counters for records delivered to the sink, records lost to sink failures,
//! and the number and size of sink writes. Filtered calls are never counted:
//! a call below the minimum level has no side effects at all.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_structured_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written(3, 120);
/// metrics.record_dropped(1);
///
/// assert_eq!(metrics.total_logged(), 3);
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.bytes_written(), 120);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed to the sink successfully
    total_logged: AtomicU64,

    /// Records lost because the sink rejected the write
    dropped_count: AtomicU64,

    /// Bytes accepted by the sink
    bytes_written: AtomicU64,

    /// Write calls issued to the sink
    sink_writes: AtomicU64,

    /// Explicit flush requests
    flushes: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            sink_writes: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_writes(&self) -> u64 {
        self.sink_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Record a successful sink write carrying `records` records
    #[inline]
    pub fn record_written(&self, records: u64, bytes: usize) {
        self.total_logged.fetch_add(records, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.sink_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `records` lost records; returns the count before this call
    #[inline]
    pub fn record_dropped(&self, records: u64) -> u64 {
        self.dropped_count.fetch_add(records, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush(&self) -> u64 {
        self.flushes.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no records have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.sink_writes.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
