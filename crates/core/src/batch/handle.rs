//! Handle to a submitted run.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::orchestrator::BatchError;
use super::types::RunSummary;
use crate::progress::RunProgress;

/// Returned by [`super::BatchOrchestrator::submit`].
///
/// Dropping the handle does not stop the run.
#[derive(Debug)]
pub struct RunHandle {
    id: Uuid,
    total: usize,
    cancel: CancellationToken,
    progress: watch::Receiver<RunProgress>,
    task: JoinHandle<RunSummary>,
}

impl RunHandle {
    pub(crate) fn new(
        id: Uuid,
        total: usize,
        cancel: CancellationToken,
        progress: watch::Receiver<RunProgress>,
        task: JoinHandle<RunSummary>,
    ) -> Self {
        Self {
            id,
            total,
            cancel,
            progress,
            task,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Requests cancellation. Idempotent; has no effect once the run settled.
    ///
    /// Items already converting finish. Items not yet started are skipped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that cancels this run when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> RunProgress {
        self.progress.borrow().clone()
    }

    /// Receiver that wakes on every progress update.
    ///
    /// `changed()` returns an error once the run has finished and the final
    /// value has been published.
    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.progress.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the run to settle.
    pub async fn wait(self) -> Result<RunSummary, BatchError> {
        self.task
            .await
            .map_err(|e| BatchError::Aborted(e.to_string()))
    }
}
