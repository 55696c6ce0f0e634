//! Contract between the reconciliation loop and a cluster worker.

use std::path::PathBuf;
use std::sync::Arc;

use crate::controller::Notifications;
use crate::model::ClusterSpec;
use crate::store::ClusterStore;

use super::backend::{Executor, ProvisionerCreator};
use super::log::ClusterLog;

/// WorkerContext is everything the factory hands to a single worker.
/// Nothing in it is shared with any other worker.
pub struct WorkerContext {
    /// Tracing span every event of the worker is recorded under.
    pub span: tracing::Span,
    pub cluster_name: String,
    /// Spec as it was when the worker was created. The store stays authoritative.
    pub spec: ClusterSpec,
    pub assets_dir: PathBuf,
    pub log: ClusterLog,
    pub executor: Arc<dyn Executor>,
    pub store: Arc<dyn ClusterStore>,
    pub provisioner_creator: Arc<dyn ProvisionerCreator>,
}

/// Worker drives the lifecycle of one cluster.
///
/// `run` must return promptly once `notifications` is closed, and must treat
/// every notification as a hint to re-read the cluster from the store.
#[async_trait::async_trait]
pub trait Worker: Send + Sync {
    async fn run(&self, ctx: WorkerContext, notifications: Notifications);
}
