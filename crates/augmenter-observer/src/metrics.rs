//! Observer metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Observer context metrics.
#[derive(Debug, Default)]
pub struct ObserverMetrics {
    /// Detection cycles run.
    pub cycles: AtomicU64,

    /// Store writes that changed the stored value.
    pub writes: AtomicU64,

    /// Cycles that found nothing to write.
    pub suppressed: AtomicU64,

    /// Successful locate calls after being unbound.
    pub relocations: AtomicU64,

    /// Locate calls that found no element.
    pub locate_failures: AtomicU64,

    /// Store writes that failed.
    pub write_failures: AtomicU64,

    /// Refresh requests served.
    pub refreshes: AtomicU64,

    /// Mutation batches received.
    pub mutation_batches: AtomicU64,

    /// Relevant interaction events received.
    pub interactions: AtomicU64,

    start_time: parking_lot::RwLock<Option<Instant>>,
}

impl ObserverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_start(&self) {
        *self.start_time.write() = Some(Instant::now());
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relocation(&self) {
        self.relocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_locate_failure(&self) {
        self.locate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation_batch(&self) {
        self.mutation_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interaction(&self) {
        self.interactions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            uptime_secs: self.uptime_secs(),
            cycles: self.cycles.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            relocations: self.relocations.load(Ordering::Relaxed),
            locate_failures: self.locate_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            mutation_batches: self.mutation_batches.load(Ordering::Relaxed),
            interactions: self.interactions.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub cycles: u64,
    pub writes: u64,
    pub suppressed: u64,
    pub relocations: u64,
    pub locate_failures: u64,
    pub write_failures: u64,
    pub refreshes: u64,
    pub mutation_batches: u64,
    pub interactions: u64,
}

impl MetricsSnapshot {
    /// Fraction of cycles that resulted in a store write.
    pub fn write_ratio(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.writes as f64 / self.cycles as f64
    }
}
