//! Aggregator counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStatsSnapshot {
    /// Collection cycles completed, empty or not.
    pub cycles: u64,
    /// Cycles whose deadline elapsed with nothing collected.
    pub empty_cycles: u64,
    /// Batches handed to the classifier.
    pub batches: u64,
    /// Texts handed to the classifier across all batches.
    pub items: u64,
    /// Batches whose classifier call failed.
    pub failed_batches: u64,
    /// Results dropped because the caller stopped waiting.
    pub abandoned: u64,
    /// Largest batch flushed so far.
    pub largest_batch: usize,
}

impl BatchStatsSnapshot {
    pub fn avg_batch_size(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.items as f64 / self.batches as f64
        }
    }
}

/// Lock-free counters shared between the aggregator task and its handle.
#[derive(Debug, Default)]
pub struct BatchStats {
    cycles: AtomicU64,
    empty_cycles: AtomicU64,
    batches: AtomicU64,
    items: AtomicU64,
    failed_batches: AtomicU64,
    abandoned: AtomicU64,
    largest_batch: AtomicUsize,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cycle(&self, collected: usize) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if collected == 0 {
            self.empty_cycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_batch(&self, size: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.items.fetch_add(size as u64, Ordering::Relaxed);
        self.largest_batch.fetch_max(size, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BatchStatsSnapshot {
        BatchStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            empty_cycles: self.empty_cycles.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            items: self.items.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            largest_batch: self.largest_batch.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_cycles_and_batches() {
        let stats = BatchStats::new();
        stats.record_cycle(0);
        stats.record_cycle(3);
        stats.record_batch(3);
        stats.record_cycle(1);
        stats.record_batch(1);
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.cycles, 3);
        assert_eq!(snap.empty_cycles, 1);
        assert_eq!(snap.batches, 2);
        assert_eq!(snap.items, 4);
        assert_eq!(snap.failed_batches, 1);
        assert_eq!(snap.largest_batch, 3);
        assert!((snap.avg_batch_size() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_snapshot_average_is_zero() {
        assert_eq!(BatchStats::new().snapshot().avg_batch_size(), 0.0);
    }
}
