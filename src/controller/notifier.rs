//! Wake-up channel between the reconciliation loop and a single worker.
//!
//! The channel is split into two capabilities: a bounded, lossy wake signal
//! that never carries a payload, and a one-shot cancellation that is the only
//! way a worker is told to stop.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Outcome of a single best-effort notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The wake-up is buffered for the worker.
    Delivered,
    /// The buffer was full; the wake-up was dropped.
    Dropped,
    /// The worker is gone; nobody will ever receive it.
    Closed,
}

/// Creates a connected notifier/receiver pair with room for `capacity` pending
/// wake-ups. `capacity` must be greater than zero.
pub fn channel(capacity: usize) -> (Notifier, Notifications) {
    let (tx, rx) = mpsc::channel(capacity);
    let cancel = CancellationToken::new();
    (
        Notifier {
            tx,
            cancel: cancel.clone(),
        },
        Notifications { rx, cancel },
    )
}

/// Sending half, owned by the reconciliation loop.
#[derive(Debug)]
pub struct Notifier {
    tx: mpsc::Sender<()>,
    cancel: CancellationToken,
}

impl Notifier {
    /// Tries to wake the worker. Never waits: on a full buffer the wake-up is dropped.
    pub fn notify(&self) -> Delivery {
        match self.tx.try_send(()) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(())) => Delivery::Dropped,
            Err(TrySendError::Closed(())) => Delivery::Closed,
        }
    }

    /// Tells the worker to stop. Consumes the notifier, so nothing can be sent after it.
    pub fn close(self) {
        self.cancel.cancel();
    }
}

/// Receiving half, owned by the worker.
#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

impl Notifications {
    /// Waits for the next wake-up. Returns `None` once the notifier was closed
    /// or dropped; pending wake-ups are discarded at that point.
    pub async fn recv(&mut self) -> Option<()> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            n = self.rx.recv() => n,
        }
    }

    /// Reports whether the worker has been told to stop.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token cancelled when the worker is told to stop, for long-running work
    /// that has to be interrupted.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
