// Package workers exposes the capabilities injected into every cluster worker.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::model::{Cluster, ClusterSpec};

use super::log::ClusterLog;

/// Executor is the execution backend bound to one cluster's assets directory.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Applies the cluster spec to the cluster.
    async fn apply(&self, spec: &ClusterSpec) -> Result<()>;
}

/// ExecutorCreator builds the executor of a single cluster.
pub trait ExecutorCreator: Send + Sync {
    /// Creates an executor bound to `assets_dir` and writing into `log`.
    fn create(&self, cluster_name: &str, assets_dir: &Path, log: ClusterLog) -> Result<Arc<dyn Executor>>;
}

/// Provisioner creates the infrastructure a cluster runs on.
#[async_trait::async_trait]
pub trait Provisioner: Send + Sync {
    /// Makes sure the infrastructure described by the cluster exists.
    async fn provision(&self, cluster_name: &str, cluster: &Cluster) -> Result<()>;
}

/// ProvisionerCreator picks the provisioner for a cluster.
/// Workers invoke it whenever they need to touch infrastructure.
pub trait ProvisionerCreator: Send + Sync {
    fn create(&self, cluster: &Cluster, log: ClusterLog) -> Result<Arc<dyn Provisioner>>;
}
