// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::factory::is_valid_cluster_name;
use crate::controller::{Settings, NOTIFICATION_BUFFER};
use crate::model::Cluster;

pub const PROD: &str = "prod";
#[allow(dead_code)]
pub const DEV: &str = "dev";
#[allow(dead_code)]
pub const TEST: &str = "test";

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_RECONCILE_FREQ: Duration = Duration::from_secs(60);
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TELEMETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MultiCluster {
    #[serde(rename = "multicluster")]
    pub multicluster: MultiClusterBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MultiClusterBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub runtime: Option<Runtime>,
    #[serde(rename = "assets_dir")]
    pub assets_dir: Option<PathBuf>,
    pub reconcile: Option<Reconcile>,
    pub shutdown: Option<Shutdown>,
    pub telemetry: Option<Telemetry>,
    pub metrics: Option<Metrics>,
    /// Clusters the in-memory store is seeded with on start up.
    #[serde(default)]
    pub clusters: BTreeMap<String, Cluster>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Runtime {
    pub num_cpus: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Reconcile {
    #[serde(default, with = "humantime_serde")]
    pub freq: Option<Duration>,
    #[serde(rename = "notification_buffer")]
    pub notification_buffer: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Shutdown {
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// How long to wait for cluster controllers to exit. Unset or zero: do not wait.
    #[serde(default, with = "humantime_serde")]
    pub drain: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Telemetry {
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metrics {
    pub enabled: bool,
    pub listen: Option<SocketAddr>,
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn runtime(&self) -> &Runtime;
    fn assets_dir(&self) -> &Path;
    fn reconcile_freq(&self) -> Duration;
    fn notification_buffer(&self) -> usize;
    fn shutdown_timeout(&self) -> Duration;
    fn drain_timeout(&self) -> Duration;
    fn telemetry_interval(&self) -> Duration;
    fn metrics_listen(&self) -> Option<SocketAddr>;
    fn clusters(&self) -> &BTreeMap<String, Cluster>;
    fn controller_settings(&self) -> Settings;
}

// Config type alias for convenience
pub type Config = MultiCluster;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.multicluster.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.multicluster.env == PROD
    }

    fn is_test(&self) -> bool {
        self.multicluster.env == TEST
    }

    fn runtime(&self) -> &Runtime {
        const ALL_CORES: Runtime = Runtime { num_cpus: 0 };
        self.multicluster.runtime.as_ref().unwrap_or(&ALL_CORES)
    }

    fn assets_dir(&self) -> &Path {
        self.multicluster
            .assets_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_ASSETS_DIR))
    }

    fn reconcile_freq(&self) -> Duration {
        self.multicluster
            .reconcile
            .as_ref()
            .and_then(|r| r.freq)
            .unwrap_or(DEFAULT_RECONCILE_FREQ)
    }

    fn notification_buffer(&self) -> usize {
        self.multicluster
            .reconcile
            .as_ref()
            .and_then(|r| r.notification_buffer)
            .unwrap_or(NOTIFICATION_BUFFER)
    }

    fn shutdown_timeout(&self) -> Duration {
        self.multicluster
            .shutdown
            .as_ref()
            .and_then(|s| s.timeout)
            .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT)
    }

    fn drain_timeout(&self) -> Duration {
        self.multicluster
            .shutdown
            .as_ref()
            .and_then(|s| s.drain)
            .unwrap_or(Duration::ZERO)
    }

    fn telemetry_interval(&self) -> Duration {
        self.multicluster
            .telemetry
            .as_ref()
            .and_then(|t| t.interval)
            .unwrap_or(DEFAULT_TELEMETRY_INTERVAL)
    }

    fn metrics_listen(&self) -> Option<SocketAddr> {
        self.multicluster
            .metrics
            .as_ref()
            .filter(|m| m.enabled)
            .and_then(|m| m.listen)
    }

    fn clusters(&self) -> &BTreeMap<String, Cluster> {
        &self.multicluster.clusters
    }

    fn controller_settings(&self) -> Settings {
        Settings {
            reconcile_freq: self.reconcile_freq(),
            notification_buffer: self.notification_buffer(),
            drain_timeout: self.drain_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        // Read file
        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("load config from {:?}", abs_path))
    }

    /// Parses and validates a YAML document.
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: MultiCluster = serde_yaml::from_str(data).context("unmarshal yaml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.notification_buffer() == 0 {
            anyhow::bail!("reconcile.notification_buffer must be greater than zero");
        }
        if self.reconcile_freq().is_zero() {
            anyhow::bail!("reconcile.freq must be greater than zero");
        }
        if self.telemetry_interval().is_zero() {
            anyhow::bail!("telemetry.interval must be greater than zero");
        }
        if let Some(metrics) = &self.multicluster.metrics {
            if metrics.enabled && metrics.listen.is_none() {
                anyhow::bail!("metrics.listen is required when metrics are enabled");
            }
        }
        if let Some(name) = self.clusters().keys().find(|n| !is_valid_cluster_name(n)) {
            anyhow::bail!("invalid cluster name {:?}", name);
        }
        Ok(())
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
