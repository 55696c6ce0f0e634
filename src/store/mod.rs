//! Watchable key/value store holding cluster definitions.

pub mod memory;
pub mod store;


pub use memory::MemoryStore;
pub use store::{ClusterStore, StoreError, WatchResponse};
