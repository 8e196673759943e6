//! Trailing-edge debounce for persisting and announcing tree changes.
//!
//! Each scheduled snapshot replaces the pending one and restarts the timer.
//! When the timer runs out the latest snapshot is saved on the blocking pool,
//! then published to change subscribers. A single task awaits every write, so
//! they land in order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::persist::Persistence;
use crate::store::Snapshot;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

pub struct DebouncedSaver {
    tx: Option<mpsc::UnboundedSender<Snapshot>>,
    task: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Start the saver task. Must be called from within a tokio runtime.
    pub fn spawn(
        persistence: Arc<dyn Persistence>,
        delay: Duration,
        changes: Arc<watch::Sender<Snapshot>>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, persistence, delay, changes));
        Self {
            tx: Some(tx),
            task: Some(task),
        }
    }

    pub fn schedule(&self, snapshot: Snapshot) {
        if let Some(tx) = &self.tx {
            if tx.send(snapshot).is_err() {
                warn!("Saver task is gone; change will not be persisted");
            }
        }
    }

    /// Flush whatever is pending right away and stop the task
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Saver task ended abnormally: {}", e);
            }
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Snapshot>,
    persistence: Arc<dyn Persistence>,
    delay: Duration,
    changes: Arc<watch::Sender<Snapshot>>,
) {
    while let Some(mut latest) = rx.recv().await {
        let mut coalesced = 1usize;
        let closed = loop {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(Some(next)) => {
                    latest = next;
                    coalesced += 1;
                }
                Ok(None) => break true,
                Err(_) => break false,
            }
        };

        debug!("Settled after {} change(s), persisting", coalesced);
        let saving = latest.clone();
        let store = persistence.clone();
        match tokio::task::spawn_blocking(move || store.save(&saving)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to persist items: {}", e),
            Err(e) => warn!("Save task did not complete: {}", e),
        }
        changes.send_replace(latest);

        if closed {
            break;
        }
    }
}
