//! Multi-cluster controller: keeps one worker per cluster defined in the store.

pub mod counters;
pub mod error;
pub mod factory;
pub mod multicluster;
pub mod notifier;
pub mod registry;
pub mod telemetry;


// Re-export main types
pub use counters::Counters;
pub use error::Skip;
pub use factory::{AssetsDir, FactoryError, WorkerFactory, CLUSTER_LOG_FILE};
pub use multicluster::{MultiClusterController, Settings, NOTIFICATION_BUFFER};
pub use notifier::{Delivery, Notifications, Notifier};
