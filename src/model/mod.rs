// Package model provides the cluster records kept in the store.

pub mod cluster;


// Re-export main types
pub use cluster::{Cluster, ClusterSpec, STATE_INSTALLED, STATE_PENDING};
