// Executor creators with controllable behavior.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::model::ClusterSpec;
use crate::workers::{ClusterLog, Executor, ExecutorCreator};

/// Executor that only counts how often it was applied.
pub struct RecordingExecutor {
    applied: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Executor for RecordingExecutor {
    async fn apply(&self, _spec: &ClusterSpec) -> Result<()> {
        self.applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

pub struct RecordingExecutorCreator {
    created: AtomicUsize,
    applied: Arc<AtomicUsize>,
}

impl RecordingExecutorCreator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            applied: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::Relaxed)
    }
}

impl ExecutorCreator for RecordingExecutorCreator {
    fn create(&self, _cluster_name: &str, _assets_dir: &Path, _log: ClusterLog) -> Result<Arc<dyn Executor>> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(RecordingExecutor {
            applied: self.applied.clone(),
        }))
    }
}

/// Always fails.
pub struct FailingExecutorCreator;

impl ExecutorCreator for FailingExecutorCreator {
    fn create(&self, cluster_name: &str, _assets_dir: &Path, _log: ClusterLog) -> Result<Arc<dyn Executor>> {
        anyhow::bail!("no executor available for cluster {cluster_name:?}")
    }
}

/// Fails for the clusters it was told to fail for, records the rest.
pub struct SelectiveExecutorCreator {
    failing: Mutex<HashSet<String>>,
    inner: Arc<RecordingExecutorCreator>,
}

impl SelectiveExecutorCreator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: Mutex::new(HashSet::new()),
            inner: RecordingExecutorCreator::new(),
        })
    }

    pub fn fail_for(&self, cluster_name: &str) {
        self.failing.lock().insert(cluster_name.to_string());
    }

    pub fn heal(&self, cluster_name: &str) {
        self.failing.lock().remove(cluster_name);
    }

    pub fn created(&self) -> usize {
        self.inner.created()
    }
}

impl ExecutorCreator for SelectiveExecutorCreator {
    fn create(&self, cluster_name: &str, assets_dir: &Path, log: ClusterLog) -> Result<Arc<dyn Executor>> {
        if self.failing.lock().contains(cluster_name) {
            anyhow::bail!("executor for cluster {cluster_name:?} is broken");
        }
        self.inner.create(cluster_name, assets_dir, log)
    }
}
