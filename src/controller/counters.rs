//! Counters for reconciliation loop statistics.
//

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Counters shared between the loop and its telemetry logger.
/// Everything except `active_workers` is reset by each telemetry flush.
pub struct Counters {
    pub workers_started: Arc<AtomicI64>,
    pub workers_stopped: Arc<AtomicI64>,
    pub notifications_delivered: Arc<AtomicI64>,
    pub notifications_dropped: Arc<AtomicI64>,
    pub skipped_events: Arc<AtomicI64>,
    pub ticks: Arc<AtomicI64>,
    pub active_workers: Arc<AtomicI64>,
}

impl Counters {
    /// Creates a new counters instance.
    pub fn new() -> Self {
        Self {
            workers_started: Arc::new(AtomicI64::new(0)),
            workers_stopped: Arc::new(AtomicI64::new(0)),
            notifications_delivered: Arc::new(AtomicI64::new(0)),
            notifications_dropped: Arc::new(AtomicI64::new(0)),
            skipped_events: Arc::new(AtomicI64::new(0)),
            ticks: Arc::new(AtomicI64::new(0)),
            active_workers: Arc::new(AtomicI64::new(0)),
        }
    }

    pub(crate) fn inc(counter: &AtomicI64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_active(&self, n: usize) {
        self.active_workers.store(n as i64, Ordering::Relaxed);
    }

    /// Takes the values accumulated since the previous reset.
    pub fn reset(&self) -> Snapshot {
        Snapshot {
            workers_started: self.workers_started.swap(0, Ordering::Relaxed),
            workers_stopped: self.workers_stopped.swap(0, Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.swap(0, Ordering::Relaxed),
            notifications_dropped: self.notifications_dropped.swap(0, Ordering::Relaxed),
            skipped_events: self.skipped_events.swap(0, Ordering::Relaxed),
            ticks: self.ticks.swap(0, Ordering::Relaxed),
            active_workers: self.active_workers.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub workers_started: i64,
    pub workers_stopped: i64,
    pub notifications_delivered: i64,
    pub notifications_dropped: i64,
    pub skipped_events: i64,
    pub ticks: i64,
    pub active_workers: i64,
}

impl Snapshot {
    pub fn is_idle(&self) -> bool {
        self.workers_started == 0
            && self.workers_stopped == 0
            && self.notifications_dropped == 0
            && self.skipped_events == 0
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
