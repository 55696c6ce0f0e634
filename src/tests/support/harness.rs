// Controller test harness.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::controller::{AssetsDir, MultiClusterController, Settings, WorkerFactory};
use crate::workers::NoopProvisionerCreator;

use super::executors::SelectiveExecutorCreator;
use super::store::FlakyStore;
use super::worker::RecordingWorker;

/// Store, executors and worker of one controller under test.
pub struct Harness {
    pub tmp: TempDir,
    pub store: Arc<FlakyStore>,
    pub executors: Arc<SelectiveExecutorCreator>,
    pub worker: Arc<RecordingWorker>,
}

impl Harness {
    pub fn new(worker: Arc<RecordingWorker>) -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
            store: FlakyStore::new(),
            executors: SelectiveExecutorCreator::new(),
            worker,
        }
    }

    pub fn assets_dir(&self) -> AssetsDir {
        AssetsDir::new(self.tmp.path().join("assets"))
    }

    /// Settings with a tick far enough away to never fire during unit tests.
    pub fn settings() -> Settings {
        Settings {
            reconcile_freq: Duration::from_secs(3600),
            ..Settings::default()
        }
    }

    pub fn controller(&self, settings: Settings) -> MultiClusterController {
        let factory = WorkerFactory::new(
            self.assets_dir(),
            self.executors.clone(),
            Arc::new(NoopProvisionerCreator),
            self.store.clone(),
        );
        MultiClusterController::new(settings, self.store.clone(), factory, self.worker.clone())
    }

    /// Starts the controller loop in the background.
    pub fn spawn(&self, settings: Settings) -> (CancellationToken, JoinHandle<()>) {
        let ctx = CancellationToken::new();
        let controller = self.controller(settings);
        let handle = tokio::spawn(controller.run(ctx.clone()));
        (ctx, handle)
    }
}
