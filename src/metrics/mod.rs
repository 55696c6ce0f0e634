//! Prometheus metrics functionality.
//
//! Loop counters are kept in atomics by the controller and flushed into the
//! `metrics` facade by its telemetry logger. The exporter is optional.

pub mod meter;

pub use meter::*;

use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Installs the Prometheus exporter serving `/metrics` on `listen`.
/// Must be called from within the tokio runtime.
pub fn init_prometheus_exporter(listen: SocketAddr) -> Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()
        .with_context(|| format!("failed to install Prometheus exporter on {listen}"))
}
