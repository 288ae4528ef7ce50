use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_synced: AtomicU64,
    records_lost: AtomicU64,
    batches_succeeded: AtomicU64,
    batches_failed: AtomicU64,
}

/// Running counters shared across concurrent batch writers.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub records_synced: u64,
    pub records_lost: u64,
    pub batches_succeeded: u64,
    pub batches_failed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    /// Adds to the running total and returns the new cumulative count.
    pub fn record_batch_success(&self, records: u64) -> u64 {
        self.inner.batches_succeeded.fetch_add(1, Ordering::Relaxed);
        self.inner.records_synced.fetch_add(records, Ordering::Relaxed) + records
    }

    pub fn record_batch_failure(&self, records: u64) {
        self.inner.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.inner.records_lost.fetch_add(records, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_synced: self.inner.records_synced.load(Ordering::Relaxed),
            records_lost: self.inner.records_lost.load(Ordering::Relaxed),
            batches_succeeded: self.inner.batches_succeeded.load(Ordering::Relaxed),
            batches_failed: self.inner.batches_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
