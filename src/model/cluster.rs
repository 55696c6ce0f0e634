//! Cluster definitions as they are persisted in the cluster store.

use serde::{Deserialize, Serialize};

/// State a cluster has not reached yet.
pub const STATE_PENDING: &str = "pending";
/// State of a cluster that has been fully provisioned and installed.
pub const STATE_INSTALLED: &str = "installed";

/// ClusterSpec is the opaque plan of a cluster.
///
/// The reconciliation loop never looks inside it; only the worker and the
/// executor interpret its contents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ClusterSpec(serde_json::Value);

impl ClusterSpec {
    /// Wraps a raw JSON document.
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    /// Returns the raw JSON document.
    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Cluster is a named, independently lifecycled resource tracked by the store.
/// The name is the store key and is therefore not part of the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Cluster {
    #[serde(rename = "desiredState", default)]
    pub desired_state: String,
    #[serde(rename = "currentState", default)]
    pub current_state: String,
    #[serde(rename = "canContinue", default = "default_can_continue")]
    pub can_continue: bool,
    #[serde(default)]
    pub spec: ClusterSpec,
}

fn default_can_continue() -> bool {
    true
}

impl Cluster {
    /// Creates a cluster that wants to reach `desired_state`.
    pub fn new(desired_state: impl Into<String>, spec: ClusterSpec) -> Self {
        Self {
            desired_state: desired_state.into(),
            current_state: STATE_PENDING.to_string(),
            can_continue: true,
            spec,
        }
    }

    /// Decodes a cluster from the raw bytes of a store value.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Encodes the cluster into the raw bytes of a store value.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Reports whether the worker still has work to do for this cluster.
    pub fn needs_reconcile(&self) -> bool {
        self.can_continue && self.desired_state != self.current_state
    }
}
