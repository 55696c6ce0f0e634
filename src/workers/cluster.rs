//! Default cluster controller: drives one cluster towards its desired state.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::controller::Notifications;

use super::worker::{Worker, WorkerContext};

/// ClusterController re-reads its cluster on every notification and, when the
/// desired state differs from the current one, provisions the infrastructure,
/// applies the spec and records the new current state in the store.
pub struct ClusterController;

#[async_trait::async_trait]
impl Worker for ClusterController {
    async fn run(&self, ctx: WorkerContext, mut notifications: Notifications) {
        info!(component = "cluster-controller", event = "started", "cluster controller started");
        ctx.log.line("cluster controller started");

        while notifications.recv().await.is_some() {
            match reconcile(&ctx).await {
                Ok(true) => {
                    info!(component = "cluster-controller", event = "reconciled", "cluster reached its desired state");
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        component = "cluster-controller",
                        event = "reconcile_failed",
                        error = %format!("{e:#}"),
                        "failed to reconcile cluster"
                    );
                    ctx.log.line(format_args!("reconciliation failed: {e:#}"));
                }
            }
        }

        info!(component = "cluster-controller", event = "stopped", "cluster controller stopped");
        ctx.log.line("cluster controller stopped");
    }
}

/// Returns true when the cluster was moved to its desired state.
async fn reconcile(ctx: &WorkerContext) -> Result<bool> {
    let Some(mut cluster) = ctx
        .store
        .get(&ctx.cluster_name)
        .await
        .context("error reading cluster from the store")?
    else {
        // The reconciliation loop stops this worker on its next pass.
        debug!(component = "cluster-controller", event = "cluster_gone", "cluster is no longer defined");
        return Ok(false);
    };

    if !cluster.needs_reconcile() {
        return Ok(false);
    }

    ctx.log.line(format_args!(
        "moving cluster from {:?} to {:?}",
        cluster.current_state, cluster.desired_state
    ));

    let provisioner = ctx
        .provisioner_creator
        .create(&cluster, ctx.log.clone())
        .context("error creating provisioner")?;
    provisioner
        .provision(&ctx.cluster_name, &cluster)
        .await
        .context("error provisioning infrastructure")?;
    ctx.executor
        .apply(&cluster.spec)
        .await
        .context("error applying cluster spec")?;

    cluster.current_state = cluster.desired_state.clone();
    ctx.store
        .put(&ctx.cluster_name, &cluster)
        .await
        .context("error updating cluster state")?;
    ctx.log
        .line(format_args!("cluster is now {:?}", cluster.current_state));
    Ok(true)
}
