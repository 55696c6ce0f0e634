// Package controller provides telemetry for the reconciliation loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::metrics;

use super::counters::{Counters, Snapshot};

/// Flushes loop counters into metrics and logs them every `each`, until cancelled.
pub async fn logger(shutdown_token: CancellationToken, counters: Arc<Counters>, each: Duration) {
    let mut ticker = interval(each);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                flush(&counters.reset());
                tracing::debug!(component = "multicluster-controller", "telemetry logger stopped");
                return;
            }
            _ = ticker.tick() => {
                flush(&counters.reset());
            }
        }
    }
}

fn flush(stats: &Snapshot) {
    metrics::add_worker_stat_counters(stats.workers_started, stats.workers_stopped, stats.active_workers);
    metrics::add_notification_stat_counters(stats.notifications_delivered, stats.notifications_dropped);
    metrics::add_loop_stat_counters(stats.ticks, stats.skipped_events);

    if stats.is_idle() {
        return;
    }
    tracing::info!(
        component = "multicluster-controller",
        active_workers = stats.active_workers,
        workers_started = stats.workers_started,
        workers_stopped = stats.workers_stopped,
        notifications_delivered = stats.notifications_delivered,
        notifications_dropped = stats.notifications_dropped,
        skipped_events = stats.skipped_events,
        ticks = stats.ticks,
        "multi-cluster controller stats"
    );
}
