//! Operation queue - serializes pipeline runs

use crate::{core::ChangeEvent, core::RunRecord, execution::AutoCommitPipeline, git::GitExecutor};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Handle to an enqueued run, resolving to its record
pub struct RunHandle {
    rx: oneshot::Receiver<RunRecord>,
}

impl RunHandle {
    /// Wait for the run to reach its terminal outcome.
    /// Returns `None` when the queue shut down before the run finished.
    pub async fn record(self) -> Option<RunRecord> {
        self.rx.await.ok()
    }
}

struct QueuedRun {
    change: ChangeEvent,
    done: oneshot::Sender<RunRecord>,
}

/// FIFO queue with a single worker, so no two runs ever interleave
/// their git commands.
///
/// Capacity is unbounded; a slow push delays later events' commits,
/// which is an accepted latency trade-off. A run that fails partway
/// releases the queue for the next run.
pub struct CommitQueue {
    tx: mpsc::UnboundedSender<QueuedRun>,
}

impl CommitQueue {
    /// Spawn the worker task and return the queue front-end
    pub fn start<G: GitExecutor + 'static>(pipeline: AutoCommitPipeline<G>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedRun>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let record = pipeline.run(&job.change).await;
                // Receiver may have gone away; the run still completed
                let _ = job.done.send(record);
            }
            debug!("Commit queue drained and closed");
        });

        Self { tx }
    }

    /// Enqueue one change event; runs execute in submission order
    pub fn submit(&self, change: ChangeEvent) -> RunHandle {
        let (done, rx) = oneshot::channel();
        if self.tx.send(QueuedRun { change, done }).is_err() {
            warn!("Commit queue worker is gone; event dropped");
        }
        RunHandle { rx }
    }
}
