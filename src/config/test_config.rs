use super::{Config, MultiClusterBox};
use std::collections::BTreeMap;
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        multicluster: MultiClusterBox {
            env: super::TEST.to_string(),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            runtime: Some(super::Runtime { num_cpus: 2 }),
            assets_dir: Some("public/assets".into()),
            reconcile: Some(super::Reconcile {
                freq: Some(Duration::from_secs(60)),
                notification_buffer: Some(10),
            }),
            shutdown: Some(super::Shutdown {
                timeout: Some(Duration::from_secs(5)),
                drain: None,
            }),
            telemetry: Some(super::Telemetry {
                interval: Some(Duration::from_secs(5)),
            }),
            metrics: None,
            clusters: BTreeMap::new(),
        },
    }
}
