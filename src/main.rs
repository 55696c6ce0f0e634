// Main entrypoint for the multi-cluster controller.

use multicluster::app::App;
use multicluster::config::{Config, ConfigTrait};
use multicluster::metrics;
use multicluster::shutdown::GracefulShutdown;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const CONFIG_PATH: &str = "cfg/multicluster.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/multicluster.cfg.local.yaml";

/// Multicluster - keeps one cluster controller running per cluster defined in the store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Number of runtime worker threads: the configured value, or every core when zero.
fn worker_threads(cfg: &Config) -> usize {
    match cfg.runtime().num_cpus {
        0 => num_cpus::get(),
        n => n,
    }
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path));
    }

    // Try local config first
    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok((cfg, PathBuf::from(CONFIG_PATH_LOCAL))),
        Err(_) => {
            // Fall back to default config
            let cfg = Config::load(CONFIG_PATH)
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, PathBuf::from(CONFIG_PATH)))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_ref())
        .map(|s| s.as_str())
        .unwrap_or("debug");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config and logger come first: the runtime is sized from the config.
    let (cfg, cfg_path) = load_cfg(args.cfg)?;
    configure_logger(&cfg);
    info!(component = "config", event = "load_success", path = ?cfg_path, "config loaded");

    let threads = worker_threads(&cfg);
    if cfg.runtime().num_cpus == 0 {
        info!(
            component = "main",
            event = "num_cpus_configured",
            num_cpus = threads,
            "available cores value configured (using all available cores)"
        );
    } else {
        warn!(component = "main", event = "num_cpus_configured", num_cpus = threads, "available cores value configured");
    }

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?
        .block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<()> {
    // Create cancellation token for graceful shutdown
    let shutdown_token = CancellationToken::new();

    if let Some(listen) = cfg.metrics_listen() {
        match metrics::init_prometheus_exporter(listen) {
            Ok(()) => info!(component = "main", event = "metrics_started", %listen, "prometheus exporter started"),
            Err(e) => warn!(
                component = "main",
                event = "metrics_failed",
                error = %e,
                "metrics endpoint will not be available"
            ),
        }
    }

    // Setup graceful shutdown handler
    let mut graceful_shutdown = GracefulShutdown::new(shutdown_token.clone());
    graceful_shutdown.set_graceful_timeout(cfg.shutdown_timeout());

    // Initialize and start the application
    let app = App::new(shutdown_token.clone(), cfg).await?;
    app.serve(&graceful_shutdown);

    // Listen for OS signals or cancellation and wait for graceful shutdown
    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
