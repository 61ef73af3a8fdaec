//! Loader and retry counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking loader activity. Updates are cheap and callable from
/// any thread.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    rows_inserted: AtomicU64,
    insert_errors: AtomicU64,
    rotations: AtomicU64,
    flushes_succeeded: AtomicU64,
    flushes_failed: AtomicU64,
    rows_loaded: AtomicU64,
    bytes_uploaded: AtomicU64,
}

impl LoaderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_row(&self) {
        self.rows_inserted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert_error(&self) {
        self.insert_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush_success(&self, rows: u64, bytes: u64) {
        self.flushes_succeeded.fetch_add(1, Ordering::Relaxed);
        self.rows_loaded.fetch_add(rows, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush_failure(&self) {
        self.flushes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LoaderMetricsSnapshot {
        LoaderMetricsSnapshot {
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
            insert_errors: self.insert_errors.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            flushes_succeeded: self.flushes_succeeded.load(Ordering::Relaxed),
            flushes_failed: self.flushes_failed.load(Ordering::Relaxed),
            rows_loaded: self.rows_loaded.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LoaderMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderMetricsSnapshot {
    pub rows_inserted: u64,
    pub insert_errors: u64,
    pub rotations: u64,
    pub flushes_succeeded: u64,
    pub flushes_failed: u64,
    pub rows_loaded: u64,
    pub bytes_uploaded: u64,
}

/// Counters tracking retry policy activity.
#[derive(Debug, Default)]
pub struct RetryMetrics {
    scheduled: AtomicU64,
    fired: AtomicU64,
    exhausted: AtomicU64,
}

impl RetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_scheduled(&self) {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fired(&self) {
        self.fired.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RetryMetricsSnapshot {
        RetryMetricsSnapshot {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            fired: self.fired.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RetryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryMetricsSnapshot {
    pub scheduled: u64,
    pub fired: u64,
    pub exhausted: u64,
}
