#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use tokio::time::timeout;

    use crate::controller::{notifier, AssetsDir, WorkerFactory, CLUSTER_LOG_FILE};
    use crate::model::{Cluster, STATE_INSTALLED, STATE_PENDING};
    use crate::store::{ClusterStore, MemoryStore};
    use crate::support::{cluster, RecordingExecutorCreator, WAIT};
    use crate::workers::{
        ClusterController, ClusterLog, NoopProvisionerCreator, Provisioner, ProvisionerCreator, Worker,
        WorkerContext,
    };

    struct BrokenProvisionerCreator;

    impl ProvisionerCreator for BrokenProvisionerCreator {
        fn create(&self, _cluster: &Cluster, _log: ClusterLog) -> Result<Arc<dyn Provisioner>> {
            anyhow::bail!("no credentials for the cloud provider")
        }
    }

    async fn context(
        tmp: &tempfile::TempDir,
        store: Arc<MemoryStore>,
        executors: Arc<RecordingExecutorCreator>,
        provisioners: Arc<dyn ProvisionerCreator>,
    ) -> WorkerContext {
        let factory = WorkerFactory::new(AssetsDir::new(tmp.path()), executors, provisioners, store.clone());
        let defined = store.get("a").await.unwrap().unwrap_or_default();
        factory.build("a", &defined).await.unwrap()
    }

    async fn wait_state(store: &MemoryStore, state: &str) {
        let waited = timeout(WAIT, async {
            loop {
                let current = store.get("a").await.unwrap().map(|c| c.current_state);
                if current.as_deref() == Some(state) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "cluster never reached state {state:?}");
    }

    #[tokio::test]
    async fn test_moves_cluster_to_desired_state() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("a", &cluster(1)).await.unwrap();
        let executors = RecordingExecutorCreator::new();
        let ctx = context(&tmp, store.clone(), executors.clone(), Arc::new(NoopProvisionerCreator)).await;

        let (tx, rx) = notifier::channel(10);
        let handle = tokio::spawn(async move { ClusterController.run(ctx, rx).await });
        tx.notify();

        wait_state(&store, STATE_INSTALLED).await;
        assert_eq!(executors.applied(), 1);

        // Redundant wake-ups do not re-apply an installed cluster.
        tx.notify();
        tx.notify();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(executors.applied(), 1);

        tx.close();
        timeout(WAIT, handle).await.unwrap().unwrap();

        let log = std::fs::read_to_string(tmp.path().join("a").join(CLUSTER_LOG_FILE)).unwrap();
        assert!(log.contains("cluster controller started"));
        assert!(log.contains("cluster is now \"installed\""));
        assert!(log.contains("cluster controller stopped"));
    }

    /// Provisioning errors are logged and the worker keeps running.
    #[tokio::test]
    async fn test_failure_keeps_worker_alive() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("a", &cluster(1)).await.unwrap();
        let executors = RecordingExecutorCreator::new();
        let ctx = context(&tmp, store.clone(), executors.clone(), Arc::new(BrokenProvisionerCreator)).await;

        let (tx, rx) = notifier::channel(10);
        let handle = tokio::spawn(async move { ClusterController.run(ctx, rx).await });
        tx.notify();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        assert_eq!(executors.applied(), 0);
        assert_eq!(store.get("a").await.unwrap().unwrap().current_state, STATE_PENDING);

        tx.close();
        timeout(WAIT, handle).await.unwrap().unwrap();

        let log = std::fs::read_to_string(tmp.path().join("a").join(CLUSTER_LOG_FILE)).unwrap();
        assert!(log.contains("reconciliation failed: error creating provisioner"));
    }

    /// A wake-up for a cluster that is already gone from the store is a no-op.
    #[tokio::test]
    async fn test_missing_cluster_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let executors = RecordingExecutorCreator::new();
        let ctx = context(&tmp, store.clone(), executors.clone(), Arc::new(NoopProvisionerCreator)).await;

        let (tx, rx) = notifier::channel(10);
        let handle = tokio::spawn(async move { ClusterController.run(ctx, rx).await });
        tx.notify();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        assert_eq!(executors.applied(), 0);
        assert_eq!(store.get("a").await.unwrap(), None);

        tx.close();
        timeout(WAIT, handle).await.unwrap().unwrap();
    }
}
