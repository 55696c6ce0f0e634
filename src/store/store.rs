// Package store defines the watchable cluster store consumed by the controller.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::Cluster;

/// StoreError is returned by every fallible store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is closed")]
    Closed,
    #[error("error encoding cluster {name:?}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("error decoding cluster {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// WatchResponse is a single change observed on the store.
/// A `None` value marks the deletion of `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchResponse {
    pub key: String,
    pub value: Option<Vec<u8>>,
    pub revision: u64,
}

impl WatchResponse {
    /// Reports whether the event marks a deletion.
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// ClusterStore holds the cluster definitions.
///
/// The reconciliation loop only uses `watch` and `get_all`; workers also read
/// and update their own cluster through `get` and `put`.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Streams changes newer than `from_revision` until `ctx` is cancelled.
    async fn watch(&self, ctx: CancellationToken, from_revision: u64) -> mpsc::Receiver<WatchResponse>;

    /// Returns a point-in-time snapshot of all defined clusters.
    async fn get_all(&self) -> Result<HashMap<String, Cluster>, StoreError>;

    /// Returns the cluster stored under `name`, if any.
    async fn get(&self, name: &str) -> Result<Option<Cluster>, StoreError>;

    /// Creates or replaces the cluster stored under `name`.
    async fn put(&self, name: &str, cluster: &Cluster) -> Result<(), StoreError>;

    /// Removes the cluster stored under `name`. Deleting a missing key is a no-op.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}
