//! In-memory, revisioned implementation of the cluster store.

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::model::Cluster;

use super::store::{ClusterStore, StoreError, WatchResponse};

/// Number of past changes kept for watchers that start from an older revision.
const HISTORY_LIMIT: usize = 1024;

/// Capacity of the channel handed out to each watcher.
const WATCH_BUFFER: usize = 64;

struct Inner {
    closed: bool,
    revision: u64,
    clusters: BTreeMap<String, Vec<u8>>,
    history: VecDeque<WatchResponse>,
    watchers: Vec<mpsc::UnboundedSender<WatchResponse>>,
}

impl Inner {
    fn publish(&mut self, key: &str, value: Option<Vec<u8>>) {
        self.revision += 1;
        let resp = WatchResponse {
            key: key.to_string(),
            value,
            revision: self.revision,
        };

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(resp.clone());

        // Watchers whose consumer went away are pruned here.
        self.watchers.retain(|w| w.send(resp.clone()).is_ok());
    }
}

/// MemoryStore keeps JSON-encoded clusters in memory and fans every change out
/// to its watchers.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store at revision 0.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                closed: false,
                revision: 0,
                clusters: BTreeMap::new(),
                history: VecDeque::new(),
                watchers: Vec::new(),
            }),
        }
    }

    /// Returns the revision of the latest change.
    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    /// Stores an already encoded value as-is.
    pub fn put_raw(&self, name: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Closed);
        }
        inner.clusters.insert(name.to_string(), value.clone());
        inner.publish(name, Some(value));
        Ok(())
    }

    /// Closes the store: every watch stream ends and further calls fail.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.watchers.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterStore for MemoryStore {
    async fn watch(&self, ctx: CancellationToken, from_revision: u64) -> mpsc::Receiver<WatchResponse> {
        let (out_tx, out_rx) = mpsc::channel(WATCH_BUFFER);
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();

        {
            let mut inner = self.inner.lock();
            if inner.closed {
                // Dropping the sender ends the stream right away.
                return out_rx;
            }
            for resp in inner.history.iter().filter(|r| r.revision > from_revision) {
                let _ = in_tx.send(resp.clone());
            }
            inner.watchers.push(in_tx);
        }

        tokio::task::spawn(async move {
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        debug!(component = "store", event = "watch_cancelled", "watch stream closed");
                        return;
                    }
                    resp = in_rx.recv() => {
                        let Some(resp) = resp else { return };
                        if out_tx.send(resp).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        out_rx
    }

    async fn get_all(&self) -> Result<HashMap<String, Cluster>, StoreError> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Closed);
        }
        inner
            .clusters
            .iter()
            .map(|(name, raw)| {
                Cluster::decode(raw)
                    .map(|c| (name.clone(), c))
                    .map_err(|source| StoreError::Decode {
                        name: name.clone(),
                        source,
                    })
            })
            .collect()
    }

    async fn get(&self, name: &str) -> Result<Option<Cluster>, StoreError> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Closed);
        }
        inner
            .clusters
            .get(name)
            .map(|raw| Cluster::decode(raw))
            .transpose()
            .map_err(|source| StoreError::Decode {
                name: name.to_string(),
                source,
            })
    }

    async fn put(&self, name: &str, cluster: &Cluster) -> Result<(), StoreError> {
        let raw = cluster.encode().map_err(|source| StoreError::Encode {
            name: name.to_string(),
            source,
        })?;
        self.put_raw(name, raw)
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Closed);
        }
        if inner.clusters.remove(name).is_some() {
            inner.publish(name, None);
        }
        Ok(())
    }
}
