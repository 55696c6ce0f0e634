// Worker that records what happens to it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::controller::Notifications;
use crate::workers::{Worker, WorkerContext};

#[derive(Debug, PartialEq, Eq)]
enum WorkerEvent {
    Started(String),
    Woke(String),
    Stopped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Consumes every wake-up until closed.
    Consume,
    /// Never reads a wake-up, only waits to be closed.
    Stall,
    /// Returns right after starting, as if it crashed.
    Exit,
}

pub struct RecordingWorker {
    mode: Mode,
    events: Arc<Mutex<Vec<WorkerEvent>>>,
}

impl RecordingWorker {
    pub fn new() -> Arc<Self> {
        Self::with_mode(Mode::Consume)
    }

    pub fn stalled() -> Arc<Self> {
        Self::with_mode(Mode::Stall)
    }

    pub fn exiting() -> Arc<Self> {
        Self::with_mode(Mode::Exit)
    }

    fn with_mode(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            events: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn started(&self, name: &str) -> usize {
        self.count(&WorkerEvent::Started(name.to_string()))
    }

    pub fn woke(&self, name: &str) -> usize {
        self.count(&WorkerEvent::Woke(name.to_string()))
    }

    pub fn stopped(&self, name: &str) -> usize {
        self.count(&WorkerEvent::Stopped(name.to_string()))
    }

    /// Number of workers currently running.
    pub fn running(&self) -> usize {
        let events = self.events.lock();
        let started = events.iter().filter(|e| matches!(e, WorkerEvent::Started(_))).count();
        let stopped = events.iter().filter(|e| matches!(e, WorkerEvent::Stopped(_))).count();
        started - stopped
    }

    fn count(&self, event: &WorkerEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    fn push(&self, event: WorkerEvent) {
        self.events.lock().push(event);
    }
}

#[async_trait::async_trait]
impl Worker for RecordingWorker {
    async fn run(&self, ctx: WorkerContext, mut notifications: Notifications) {
        let name = ctx.cluster_name.clone();
        self.push(WorkerEvent::Started(name.clone()));
        match self.mode {
            Mode::Consume => {
                while notifications.recv().await.is_some() {
                    self.push(WorkerEvent::Woke(name.clone()));
                }
            }
            Mode::Stall => notifications.cancellation().cancelled().await,
            Mode::Exit => {}
        }
        self.push(WorkerEvent::Stopped(name));
    }
}
