// Common test utilities.

use std::time::Duration;

use serde_json::json;

use crate::model::{Cluster, ClusterSpec, STATE_INSTALLED};
use crate::store::WatchResponse;

/// Upper bound for anything the tests wait on.
pub const WAIT: Duration = Duration::from_secs(3);

/// Builds a cluster whose spec is told apart by `masters`.
pub fn cluster(masters: u32) -> Cluster {
    Cluster::new(STATE_INSTALLED, ClusterSpec::new(json!({ "masters": masters })))
}

/// Builds the watch event for a create or update of `name`.
pub fn put_event(name: &str, cluster: &Cluster) -> WatchResponse {
    WatchResponse {
        key: name.to_string(),
        value: Some(cluster.encode().unwrap()),
        revision: 0,
    }
}

/// Builds the watch event for the deletion of `name`.
pub fn delete_event(name: &str) -> WatchResponse {
    WatchResponse {
        key: name.to_string(),
        value: None,
        revision: 0,
    }
}

/// Builds a watch event carrying an undecodable value.
pub fn garbage_event(name: &str) -> WatchResponse {
    WatchResponse {
        key: name.to_string(),
        value: Some(b"{definitely not json".to_vec()),
        revision: 0,
    }
}

/// Polls `cond` until it holds or `WAIT` elapses.
pub async fn eventually<F>(what: &str, cond: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for: {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
