//! Reasons the reconciliation loop skips a unit of work.
//!
//! None of them stop the loop: the affected cluster or tick is left as it
//! was and picked up again by the next watch event or tick.

use crate::store::StoreError;

use super::factory::FactoryError;

#[derive(Debug, thiserror::Error)]
pub enum Skip {
    #[error("error decoding watch event value for cluster {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("error creating cluster controller for cluster {name:?}: {source}")]
    Factory {
        name: String,
        #[source]
        source: FactoryError,
    },
    #[error("failed to get all the clusters defined in the store: {0}")]
    Snapshot(#[source] StoreError),
}

impl Skip {
    /// Short event name used in structured logs.
    pub fn event(&self) -> &'static str {
        match self {
            Skip::Decode { .. } => "decode_failed",
            Skip::Factory { .. } => "factory_failed",
            Skip::Snapshot(_) => "snapshot_failed",
        }
    }

    /// Cluster the skipped work belonged to, if it was about a single cluster.
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Skip::Decode { name, .. } | Skip::Factory { name, .. } => Some(name),
            Skip::Snapshot(_) => None,
        }
    }
}
