//! Per-cluster log file sink.

use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// ClusterLog appends timestamped lines to a cluster's `kismatic.log`.
/// Clones share the same file handle.
#[derive(Clone)]
pub struct ClusterLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl ClusterLog {
    pub fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one line. Write failures are reported through tracing only.
    pub fn line(&self, msg: impl Display) {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{now} {msg}") {
            warn!(
                component = "cluster-log",
                event = "write_failed",
                path = ?self.path,
                error = %e,
                "failed to write cluster log line"
            );
        }
    }
}

impl std::fmt::Debug for ClusterLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterLog").field("path", &self.path).finish()
    }
}
