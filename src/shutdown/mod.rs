// Package shutdown provides graceful shutdown functionality.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

const COMPONENT: &str = "graceful-shutdown";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
#[error("graceful shutdown timeout exceeded")]
pub struct TimeoutError;

/// Graceful shutdown handler.
///
/// Tasks started through [`GracefulShutdown::spawn`] are tracked; once a
/// signal arrives (or the token is cancelled) the token is cancelled and the
/// tracked tasks get a bounded amount of time to return.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
    timeout: Duration,
    tracker: TaskTracker,
}

impl GracefulShutdown {
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            shutdown_token,
            timeout: DEFAULT_TIMEOUT,
            tracker: TaskTracker::new(),
        }
    }

    /// Sets the graceful shutdown timeout
    pub fn set_graceful_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Spawns a task that shutdown waits for.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of tracked tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for shutdown signal and then waits for all tasks to complete
    pub async fn await_shutdown(&self) -> Result<()> {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!(component = COMPONENT, event = "os_signal", signal = "SIGINT", "cancellation started");
            }
            _ = terminate() => {
                info!(component = COMPONENT, event = "os_signal", signal = "SIGTERM", "cancellation started");
            }
            _ = self.shutdown_token.cancelled() => {
                info!(component = COMPONENT, event = "ctx_done", "cancellation started");
            }
        }

        self.cancel_and_await_with_timeout().await
    }

    async fn cancel_and_await_with_timeout(&self) -> Result<()> {
        self.shutdown_token.cancel();
        self.tracker.close();

        match timeout(self.timeout, self.tracker.wait()).await {
            Ok(()) => {
                info!(component = COMPONENT, event = "shutdown_success", "service was gracefully shut down");
                Ok(())
            }
            Err(_) => {
                warn!(
                    component = COMPONENT,
                    event = "shutdown_timeout",
                    timeout = %humantime::format_duration(self.timeout),
                    pending = self.tracker.len(),
                    "not all tasks were closed within timeout"
                );
                Err(TimeoutError.into())
            }
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!(component = COMPONENT, event = "sigterm_unavailable", error = %e, "cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
