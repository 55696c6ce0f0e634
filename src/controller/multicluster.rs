//! Multi-cluster reconciliation loop.
//!
//! The multi-cluster controller owns one worker (cluster controller) per
//! cluster defined in the store. A new worker is created the first time a
//! cluster is seen, woken up whenever the cluster changes and stopped when the
//! cluster is deleted. Store watch events, a periodic full reconciliation and
//! the shutdown signal are handled one at a time by a single task, which is
//! the only owner of the worker registry.
//!
//! Wake-ups never block the loop: every worker gets a small buffer and a
//! wake-up that does not fit is dropped. Workers re-read their cluster from
//! the store when woken, so a dropped wake-up only delays them until the next
//! watch event or tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use crate::model::Cluster;
use crate::store::{ClusterStore, WatchResponse};
use crate::workers::Worker;

use super::counters::Counters;
use super::error::Skip;
use super::factory::WorkerFactory;
use super::notifier::Delivery;
use super::registry::Registry;

/// Default number of wake-ups buffered per worker.
pub const NOTIFICATION_BUFFER: usize = 10;

const COMPONENT: &str = "multicluster-controller";

/// Tunables of the reconciliation loop.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Period of the full reconciliation sweep.
    pub reconcile_freq: Duration,
    /// Wake-ups buffered per worker. Zero is treated as one.
    pub notification_buffer: usize,
    /// How long shutdown waits for workers to exit. Zero means it does not wait.
    pub drain_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reconcile_freq: Duration::from_secs(60),
            notification_buffer: NOTIFICATION_BUFFER,
            drain_timeout: Duration::ZERO,
        }
    }
}

pub struct MultiClusterController {
    settings: Settings,
    store: Arc<dyn ClusterStore>,
    factory: WorkerFactory,
    worker: Arc<dyn Worker>,
    registry: Registry,
    tasks: JoinSet<()>,
    counters: Arc<Counters>,
}

impl MultiClusterController {
    /// A zero `notification_buffer` is raised to one.
    pub fn new(
        mut settings: Settings,
        store: Arc<dyn ClusterStore>,
        factory: WorkerFactory,
        worker: Arc<dyn Worker>,
    ) -> Self {
        if settings.notification_buffer == 0 {
            warn!(
                component = COMPONENT,
                event = "buffer_raised",
                "notification buffer of 0 is not usable, using 1"
            );
            settings.notification_buffer = 1;
        }
        let registry = Registry::new(settings.notification_buffer);
        Self {
            settings,
            store,
            factory,
            worker,
            registry,
            tasks: JoinSet::new(),
            counters: Arc::new(Counters::new()),
        }
    }

    /// Counters updated by the loop, for the telemetry logger.
    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }

    /// Runs the loop until `ctx` is cancelled. On return every worker has been
    /// told to stop.
    pub async fn run(mut self, ctx: CancellationToken) {
        info!(
            component = COMPONENT,
            event = "started",
            reconcile_freq = %humantime::format_duration(self.settings.reconcile_freq),
            notification_buffer = self.settings.notification_buffer,
            "started multi-cluster controller"
        );

        let watch_ctx = ctx.child_token();
        let mut watch = self.store.watch(watch_ctx.clone(), 0).await;
        let mut watch_open = true;

        let mut ticker = interval(self.settings.reconcile_freq);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    self.shutdown().await;
                    watch_ctx.cancel();
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(skip) = self.reconcile().await {
                        self.log_skip(&skip);
                    }
                }
                resp = watch.recv(), if watch_open => {
                    match resp {
                        Some(resp) => {
                            if let Err(skip) = self.handle_watch_event(resp).await {
                                self.log_skip(&skip);
                            }
                        }
                        None => {
                            warn!(
                                component = COMPONENT,
                                event = "watch_closed",
                                "store watch stream closed, relying on periodic reconciliation"
                            );
                            watch_open = false;
                        }
                    }
                }
            }
        }
    }

    /// Applies a single store change.
    pub(crate) async fn handle_watch_event(&mut self, resp: WatchResponse) -> Result<(), Skip> {
        let WatchResponse { key: name, value, .. } = resp;

        let Some(value) = value else {
            if self.registry.terminate(&name) {
                self.worker_stopped(&name, "cluster deleted");
            } else {
                debug!(component = COMPONENT, cluster = %name, "deleted cluster had no cluster controller");
            }
            return Ok(());
        };

        if !self.registry.contains(&name) {
            let cluster = Cluster::decode(&value).map_err(|source| Skip::Decode {
                name: name.clone(),
                source,
            })?;
            self.start_worker(&name, &cluster).await?;
        }

        self.notify(&name);
        Ok(())
    }

    /// Full sweep: start missing workers, stop the ones whose cluster is gone,
    /// then wake everybody. A failed snapshot leaves the registry untouched.
    pub(crate) async fn reconcile(&mut self) -> Result<(), Skip> {
        info!(component = COMPONENT, event = "tick", "tick");
        Counters::inc(&self.counters.ticks);
        self.reap_finished();

        let defined = self.store.get_all().await.map_err(Skip::Snapshot)?;

        let mut missing: Vec<&String> = defined
            .keys()
            .filter(|name| !self.registry.contains(name))
            .collect();
        missing.sort_unstable();
        for name in missing {
            if let Err(skip) = self.start_worker(name, &defined[name]).await {
                self.log_skip(&skip);
            }
        }

        for name in self.registry.terminate_unless(|name| defined.contains_key(name)) {
            self.worker_stopped(&name, "cluster no longer defined");
        }

        for (name, delivery) in self.registry.notify_all() {
            self.record_delivery(&name, delivery);
        }
        Ok(())
    }

    /// Stops every worker. Waits for them only when a drain timeout is set.
    pub(crate) async fn shutdown(&mut self) {
        info!(component = COMPONENT, event = "stopping", "stopping the multi-cluster controller");

        let closed = self.registry.close_all();
        self.counters.workers_stopped.fetch_add(closed as i64, std::sync::atomic::Ordering::Relaxed);
        self.counters.set_active(0);

        let drain = self.settings.drain_timeout;
        if drain.is_zero() {
            self.tasks.detach_all();
            info!(component = COMPONENT, event = "stopped", workers = closed, "multi-cluster controller stopped");
            return;
        }

        let tasks = &mut self.tasks;
        let drained = timeout(drain, async {
            while let Some(res) = tasks.join_next().await {
                log_join_result(res);
            }
        })
        .await;

        match drained {
            Ok(()) => {
                info!(component = COMPONENT, event = "stopped", workers = closed, "all cluster controllers exited");
            }
            Err(_) => {
                warn!(
                    component = COMPONENT,
                    event = "drain_timeout",
                    remaining = self.tasks.len(),
                    timeout = %humantime::format_duration(drain),
                    "not all cluster controllers exited within the drain timeout"
                );
                self.tasks.detach_all();
            }
        }
    }

    /// Builds the worker of `name`, registers it, then starts it. Nothing is
    /// registered if the factory fails.
    async fn start_worker(&mut self, name: &str, cluster: &Cluster) -> Result<(), Skip> {
        let ctx = self
            .factory
            .build(name, cluster)
            .await
            .map_err(|source| Skip::Factory {
                name: name.to_string(),
                source,
            })?;

        let Some(notifications) = self.registry.register(name) else {
            return Ok(());
        };

        let span = ctx.span.clone();
        let worker = self.worker.clone();
        self.tasks
            .spawn(async move { worker.run(ctx, notifications).await }.instrument(span));

        Counters::inc(&self.counters.workers_started);
        self.counters.set_active(self.registry.len());
        info!(component = COMPONENT, event = "worker_started", cluster = %name, "started cluster controller");
        Ok(())
    }

    fn notify(&mut self, name: &str) {
        if let Some(delivery) = self.registry.notify(name) {
            self.record_delivery(name, delivery);
        }
    }

    fn record_delivery(&mut self, name: &str, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => Counters::inc(&self.counters.notifications_delivered),
            Delivery::Dropped => {
                Counters::inc(&self.counters.notifications_dropped);
                warn!(
                    component = COMPONENT,
                    event = "buffer_full",
                    cluster = %name,
                    "buffer of cluster is full, dropping notification"
                );
            }
            Delivery::Closed => {
                // The worker exited without being told to; forget it so the
                // next tick creates a new one.
                self.registry.terminate(name);
                self.worker_stopped(name, "cluster controller exited on its own");
            }
        }
    }

    fn worker_stopped(&self, name: &str, reason: &str) {
        Counters::inc(&self.counters.workers_stopped);
        self.counters.set_active(self.registry.len());
        info!(component = COMPONENT, event = "worker_stopped", cluster = %name, reason, "stopped cluster controller");
    }

    fn log_skip(&self, skip: &Skip) {
        Counters::inc(&self.counters.skipped_events);
        error!(
            component = COMPONENT,
            event = skip.event(),
            cluster = skip.cluster().unwrap_or("-"),
            error = %skip,
            "skipped"
        );
    }

    fn reap_finished(&mut self) {
        while let Some(res) = self.tasks.try_join_next() {
            log_join_result(res);
        }
    }
}

fn log_join_result(res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!(component = COMPONENT, event = "worker_panicked", error = %e, "cluster controller panicked");
        }
    }
}

#[cfg(test)]
#[path = "multicluster_test.rs"]
mod multicluster_test;
