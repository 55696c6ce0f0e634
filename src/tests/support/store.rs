// Cluster store whose snapshots can be made to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::Cluster;
use crate::store::{ClusterStore, MemoryStore, StoreError, WatchResponse};

pub struct FlakyStore {
    inner: MemoryStore,
    fail_snapshots: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_snapshots: AtomicBool::new(false),
        })
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl ClusterStore for FlakyStore {
    async fn watch(&self, ctx: CancellationToken, from_revision: u64) -> mpsc::Receiver<WatchResponse> {
        self.inner.watch(ctx, from_revision).await
    }

    async fn get_all(&self) -> Result<HashMap<String, Cluster>, StoreError> {
        if self.fail_snapshots.load(Ordering::Relaxed) {
            return Err(StoreError::Closed);
        }
        self.inner.get_all().await
    }

    async fn get(&self, name: &str) -> Result<Option<Cluster>, StoreError> {
        self.inner.get(name).await
    }

    async fn put(&self, name: &str, cluster: &Cluster) -> Result<(), StoreError> {
        self.inner.put(name, cluster).await
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.inner.delete(name).await
    }
}
