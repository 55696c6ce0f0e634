// Metric names and recording helpers for the reconciliation loop.

// Metric name constants
pub const WORKERS_STARTED: &str = "multicluster_workers_started_total";
pub const WORKERS_STOPPED: &str = "multicluster_workers_stopped_total";
pub const ACTIVE_WORKERS: &str = "multicluster_active_workers";

pub const NOTIFICATIONS_DELIVERED: &str = "multicluster_notifications_delivered_total";
pub const NOTIFICATIONS_DROPPED: &str = "multicluster_notifications_dropped_total";

pub const SKIPPED_EVENTS: &str = "multicluster_skipped_events_total";
pub const RECONCILE_TICKS: &str = "multicluster_reconcile_ticks_total";

/// Adds worker lifecycle counters.
pub fn add_worker_stat_counters(started: i64, stopped: i64, active: i64) {
    metrics::counter!(WORKERS_STARTED).increment(started.max(0) as u64);
    metrics::counter!(WORKERS_STOPPED).increment(stopped.max(0) as u64);
    metrics::gauge!(ACTIVE_WORKERS).set(active as f64);
}

/// Adds notification delivery counters.
pub fn add_notification_stat_counters(delivered: i64, dropped: i64) {
    metrics::counter!(NOTIFICATIONS_DELIVERED).increment(delivered.max(0) as u64);
    metrics::counter!(NOTIFICATIONS_DROPPED).increment(dropped.max(0) as u64);
}

/// Adds loop activity counters.
pub fn add_loop_stat_counters(ticks: i64, skipped: i64) {
    metrics::counter!(RECONCILE_TICKS).increment(ticks.max(0) as u64);
    metrics::counter!(SKIPPED_EVENTS).increment(skipped.max(0) as u64);
}
