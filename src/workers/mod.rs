// Cluster workers and the capabilities injected into them.

pub mod backend;
pub mod cluster;
pub mod local;
pub mod log;
pub mod worker;

#[cfg(test)]
mod cluster_test;

// Re-export main types
pub use backend::{Executor, ExecutorCreator, Provisioner, ProvisionerCreator};
pub use cluster::ClusterController;
pub use local::{LocalExecutor, LocalExecutorCreator, NoopProvisioner, NoopProvisionerCreator, PLAN_FILE};
pub use log::ClusterLog;
pub use worker::{Worker, WorkerContext};
