// Main multi-cluster application implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Config, ConfigTrait};
use crate::controller::{telemetry, AssetsDir, MultiClusterController, WorkerFactory};
use crate::shutdown::GracefulShutdown;
use crate::store::{ClusterStore, MemoryStore};
use crate::workers::{ClusterController, LocalExecutorCreator, NoopProvisionerCreator};

/// Encapsulates the entire application state.
pub struct App {
    cfg: Config,
    shutdown_token: CancellationToken,
    store: Arc<MemoryStore>,
    controller: MultiClusterController,
}

impl App {
    /// Creates the store, seeds it with the configured clusters and wires the
    /// multi-cluster controller on top of it.
    pub async fn new(shutdown_token: CancellationToken, cfg: Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        for (name, cluster) in cfg.clusters() {
            store
                .put(name, cluster)
                .await
                .with_context(|| format!("seed cluster {name:?}"))?;
        }

        let factory = WorkerFactory::new(
            AssetsDir::new(cfg.assets_dir()),
            Arc::new(LocalExecutorCreator),
            Arc::new(NoopProvisionerCreator),
            store.clone(),
        );
        let controller = MultiClusterController::new(
            cfg.controller_settings(),
            store.clone(),
            factory,
            Arc::new(ClusterController),
        );

        Ok(Self {
            cfg,
            shutdown_token,
            store,
            controller,
        })
    }

    /// The cluster store the controller watches.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// Starts the controller and its telemetry logger as tasks tracked by `gsh`.
    /// Both stop when the shutdown token is cancelled.
    pub fn serve(self, gsh: &GracefulShutdown) {
        let App {
            cfg,
            shutdown_token,
            store,
            controller,
        } = self;

        gsh.spawn(telemetry::logger(
            shutdown_token.clone(),
            controller.counters(),
            cfg.telemetry_interval(),
        ));

        gsh.spawn(async move {
            controller.run(shutdown_token).await;
            store.close();
            info!(component = "app", event = "stopped", "application lifecycle");
        });

        info!(
            component = "app",
            event = "started",
            clusters = cfg.clusters().len(),
            assets_dir = ?cfg.assets_dir(),
            "application lifecycle"
        );
    }
}
