//! Backends used when nothing more specific is configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::model::{Cluster, ClusterSpec};

use super::backend::{Executor, ExecutorCreator, Provisioner, ProvisionerCreator};
use super::log::ClusterLog;

/// Name of the file the local executor writes the applied spec to.
pub const PLAN_FILE: &str = "plan.json";

/// LocalExecutor records the applied spec in the cluster's assets directory.
pub struct LocalExecutor {
    cluster_name: String,
    plan_path: PathBuf,
    log: ClusterLog,
}

#[async_trait::async_trait]
impl Executor for LocalExecutor {
    async fn apply(&self, spec: &ClusterSpec) -> Result<()> {
        let data = serde_json::to_vec_pretty(spec).context("encode cluster plan")?;
        tokio::fs::write(&self.plan_path, data)
            .await
            .with_context(|| format!("write cluster plan {:?}", self.plan_path))?;
        self.log
            .line(format_args!("applied plan of cluster {:?} to {:?}", self.cluster_name, self.plan_path));
        Ok(())
    }
}

pub struct LocalExecutorCreator;

impl ExecutorCreator for LocalExecutorCreator {
    fn create(&self, cluster_name: &str, assets_dir: &Path, log: ClusterLog) -> Result<Arc<dyn Executor>> {
        if !assets_dir.is_dir() {
            anyhow::bail!("assets directory {:?} does not exist", assets_dir);
        }
        Ok(Arc::new(LocalExecutor {
            cluster_name: cluster_name.to_string(),
            plan_path: assets_dir.join(PLAN_FILE),
            log,
        }))
    }
}

/// NoopProvisioner is used when infrastructure is managed outside the controller.
pub struct NoopProvisioner {
    log: ClusterLog,
}

#[async_trait::async_trait]
impl Provisioner for NoopProvisioner {
    async fn provision(&self, cluster_name: &str, _cluster: &Cluster) -> Result<()> {
        self.log.line(format_args!(
            "infrastructure of cluster {cluster_name:?} is managed externally, nothing to provision"
        ));
        Ok(())
    }
}

pub struct NoopProvisionerCreator;

impl ProvisionerCreator for NoopProvisionerCreator {
    fn create(&self, _cluster: &Cluster, log: ClusterLog) -> Result<Arc<dyn Provisioner>> {
        Ok(Arc::new(NoopProvisioner { log }))
    }
}
