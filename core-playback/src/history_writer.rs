//! Ordered watched-time writes.
//!
//! Every history write, whether from the persistence timer, a finished
//! video or an explicit `update_position`, is queued here from inside a
//! controller job. A single task drains the queue, so writes reach the
//! history service in the order the controller produced them.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::HistoryService;
use core_async::runtime::Handle;
use core_async::sync::{mpsc, oneshot};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

struct HistoryWrite {
    token: String,
    elapsed: Duration,
    done: Option<oneshot::Sender<BridgeResult<()>>>,
}

/// Sending half of the writer task. The task exits once this is dropped and
/// the backlog is written.
pub(crate) struct HistoryWriter {
    tx: mpsc::UnboundedSender<HistoryWrite>,
}

impl HistoryWriter {
    pub(crate) fn spawn(runtime: &Handle, history: Arc<dyn HistoryService>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<HistoryWrite>();
        runtime.spawn(async move {
            while let Some(write) = rx.recv().await {
                let result = history
                    .update_media_history(&write.token, write.elapsed)
                    .await;
                match write.done {
                    Some(done) => {
                        // Caller may have given up waiting.
                        let _ = done.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            warn!(error = %e, "Failed to persist watched time");
                        }
                    }
                }
            }
            trace!("History writer stopped");
        });
        Self { tx }
    }

    /// Queue a write nobody waits for.
    pub(crate) fn write(&self, token: String, elapsed: Duration) {
        let write = HistoryWrite {
            token,
            elapsed,
            done: None,
        };
        if self.tx.send(write).is_err() {
            warn!("History writer gone; watched time dropped");
        }
    }

    /// Queue a write and get its outcome once it has been applied. The
    /// receiver errors if the writer shut down first.
    pub(crate) fn write_confirmed(
        &self,
        token: String,
        elapsed: Duration,
    ) -> oneshot::Receiver<BridgeResult<()>> {
        let (done, rx) = oneshot::channel();
        let write = HistoryWrite {
            token,
            elapsed,
            done: Some(done),
        };
        // A failed send drops `done`, which the receiver reports.
        let _ = self.tx.send(write);
        rx
    }
}
