//! Mutable state of a single run.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::types::{ItemReport, RunSummary};
use crate::progress::{BatchEvent, ProgressReporter, RunProgress};

/// Shared between the dispatcher and its workers. Observers only ever see
/// the [`RunProgress`] projection.
#[derive(Debug)]
pub(crate) struct RunState {
    pub(crate) id: Uuid,
    pub(crate) total: usize,
    pub(crate) cancel: CancellationToken,
    completed: AtomicUsize,
    reporter: ProgressReporter,
}

impl RunState {
    pub(crate) fn new(
        id: Uuid,
        total: usize,
        cancel: CancellationToken,
        events: Option<mpsc::UnboundedSender<BatchEvent>>,
    ) -> Self {
        Self {
            id,
            total,
            cancel,
            completed: AtomicUsize::new(0),
            reporter: ProgressReporter::new(id, total, events),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.reporter.subscribe()
    }

    /// Counts a settled item and publishes the new count. Returns the count.
    pub(crate) fn record_item(&self, report: &ItemReport) -> usize {
        let mut done = 0;
        self.reporter.publish(|progress| {
            done = (self.completed.fetch_add(1, Ordering::SeqCst) + 1).min(self.total);
            progress.apply_item(done, report);
            Some(BatchEvent::ItemFinished {
                run_id: self.id,
                completed: done,
                total: self.total,
                report: report.clone(),
            })
        });
        done
    }

    /// Publishes the terminal state.
    pub(crate) fn finish(&self, summary: &RunSummary) {
        self.reporter.publish(|progress| {
            progress.apply_outcome(summary.outcome);
            Some(BatchEvent::Finished {
                summary: summary.clone(),
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::types::{ConversionOutcome, RunOutcome};
    use chrono::Utc;
    use std::path::PathBuf;

    fn converted(index: usize) -> ItemReport {
        ItemReport {
            index,
            source: PathBuf::from(format!("/in/{}.png", index)),
            outcome: ConversionOutcome::Converted {
                destination: PathBuf::from(format!("/out/{}.jpeg", index)),
            },
            elapsed_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_record_item_increments_and_emits() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let state = RunState::new(Uuid::new_v4(), 2, CancellationToken::new(), Some(tx));
        let progress = state.subscribe();

        assert_eq!(state.record_item(&converted(0)), 1);
        assert_eq!(progress.borrow().completed, 1);

        assert!(matches!(rx.recv().await, Some(BatchEvent::Started { .. })));
        assert!(matches!(
            rx.recv().await,
            Some(BatchEvent::ItemFinished { completed: 1, total: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_completed_never_exceeds_total() {
        let state = RunState::new(Uuid::new_v4(), 1, CancellationToken::new(), None);
        state.record_item(&converted(0));
        assert_eq!(state.record_item(&converted(0)), 1);
    }

    #[tokio::test]
    async fn test_finish_publishes_terminal_state() {
        let state = RunState::new(Uuid::new_v4(), 1, CancellationToken::new(), None);
        let progress = state.subscribe();
        let report = converted(0);
        state.record_item(&report);

        let summary =
            RunSummary::from_reports(state.id, RunOutcome::Success, vec![report], Utc::now());
        state.finish(&summary);

        let latest = progress.borrow();
        assert_eq!(latest.terminal, Some(RunOutcome::Success));
        assert_eq!(latest.status, "Completed successfully");
    }
}
