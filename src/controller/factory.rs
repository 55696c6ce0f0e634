//! Worker factory: acquires everything a worker needs before it may be registered.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::info_span;

use crate::model::Cluster;
use crate::store::ClusterStore;
use crate::workers::{ClusterLog, ExecutorCreator, ProvisionerCreator, WorkerContext};

/// File name of the per-cluster log inside its assets directory.
pub const CLUSTER_LOG_FILE: &str = "kismatic.log";

/// Permissions of a cluster's assets directory.
#[cfg(unix)]
const ASSETS_DIR_MODE: u32 = 0o700;

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("cluster name {name:?} cannot be used as a directory name")]
    InvalidName { name: String },
    #[error("error creating assets directory {path:?}: {source}")]
    AssetsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error creating log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error creating executor: {0:#}")]
    Executor(#[source] anyhow::Error),
}

/// AssetsDir is the root under which every cluster gets its own directory.
#[derive(Debug, Clone)]
pub struct AssetsDir(PathBuf);

impl AssetsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    /// Returns the directory that belongs to `cluster_name`, always a direct
    /// child of the root.
    pub fn for_cluster(&self, cluster_name: &str) -> Result<PathBuf, FactoryError> {
        if !is_valid_cluster_name(cluster_name) {
            return Err(FactoryError::InvalidName {
                name: cluster_name.to_string(),
            });
        }
        Ok(self.0.join(cluster_name))
    }
}

/// Reports whether `name` is a single plain path component: not empty, not
/// `.` or `..`, no separators, not absolute, no NUL.
pub fn is_valid_cluster_name(name: &str) -> bool {
    if name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

/// WorkerFactory builds a `WorkerContext` for a cluster, or fails as a whole.
pub struct WorkerFactory {
    assets_dir: AssetsDir,
    executor_creator: Arc<dyn ExecutorCreator>,
    provisioner_creator: Arc<dyn ProvisionerCreator>,
    store: Arc<dyn ClusterStore>,
}

impl WorkerFactory {
    pub fn new(
        assets_dir: AssetsDir,
        executor_creator: Arc<dyn ExecutorCreator>,
        provisioner_creator: Arc<dyn ProvisionerCreator>,
        store: Arc<dyn ClusterStore>,
    ) -> Self {
        Self {
            assets_dir,
            executor_creator,
            provisioner_creator,
            store,
        }
    }

    /// Checks `cluster_name`, then creates, in order, the assets directory, the
    /// log file and the executor of the cluster. Nothing is retried here.
    pub async fn build(&self, cluster_name: &str, cluster: &Cluster) -> Result<WorkerContext, FactoryError> {
        let assets_dir = self.assets_dir.for_cluster(cluster_name)?;
        create_assets_dir(&assets_dir)
            .await
            .map_err(|source| FactoryError::AssetsDir {
                path: assets_dir.clone(),
                source,
            })?;

        let log_path = assets_dir.join(CLUSTER_LOG_FILE);
        let file = tokio::fs::File::create(&log_path)
            .await
            .map_err(|source| FactoryError::LogFile {
                path: log_path.clone(),
                source,
            })?;
        let log = ClusterLog::new(log_path, file.into_std().await);

        let executor = self
            .executor_creator
            .create(cluster_name, &assets_dir, log.clone())
            .map_err(FactoryError::Executor)?;

        Ok(WorkerContext {
            span: info_span!("cluster", cluster = %cluster_name),
            cluster_name: cluster_name.to_string(),
            spec: cluster.spec.clone(),
            assets_dir,
            log,
            executor,
            store: self.store.clone(),
            provisioner_creator: self.provisioner_creator.clone(),
        })
    }
}

async fn create_assets_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(ASSETS_DIR_MODE);
    builder.create(path).await
}
