//! Publisher side of run progress.

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use super::types::{BatchEvent, RunProgress};

/// Owns the write end of a run's progress channel.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<RunProgress>,
    events: Option<mpsc::UnboundedSender<BatchEvent>>,
}

impl ProgressReporter {
    /// Creates a reporter for a run of `total` items and emits `Started`.
    pub fn new(
        run_id: Uuid,
        total: usize,
        events: Option<mpsc::UnboundedSender<BatchEvent>>,
    ) -> Self {
        let (tx, _rx) = watch::channel(RunProgress::new(run_id, total));
        if let Some(events) = &events {
            let _ = events.send(BatchEvent::Started { run_id, total });
        }
        Self { tx, events }
    }

    /// New receiver observing the latest progress.
    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.tx.subscribe()
    }

    /// Copy of the current progress.
    pub fn current(&self) -> RunProgress {
        self.tx.borrow().clone()
    }

    /// Mutates the published progress and emits the returned event, if any,
    /// while observers are locked out.
    ///
    /// Anything `update` does (including counter increments) is observed
    /// together with the resulting progress value.
    pub fn publish<F>(&self, update: F)
    where
        F: FnOnce(&mut RunProgress) -> Option<BatchEvent>,
    {
        self.tx.send_modify(|progress| {
            if let Some(event) = update(progress) {
                if let Some(events) = &self.events {
                    // Receiver may have gone away; progress still flows through watch
                    let _ = events.send(event);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_started_event_emitted() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter::new(Uuid::new_v4(), 2, Some(tx));
        assert!(matches!(
            rx.recv().await,
            Some(BatchEvent::Started { total: 2, .. })
        ));
        assert_eq!(reporter.current().total, 2);
    }

    #[tokio::test]
    async fn test_publish_notifies_subscribers() {
        let reporter = ProgressReporter::new(Uuid::new_v4(), 3, None);
        let mut rx = reporter.subscribe();

        reporter.publish(|p| {
            p.completed = 1;
            None
        });

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().completed, 1);
    }

    #[tokio::test]
    async fn test_concurrent_publishes_are_ordered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = Arc::new(ProgressReporter::new(Uuid::new_v4(), 200, Some(tx)));
        let counter = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..200)
            .map(|_| {
                let reporter = Arc::clone(&reporter);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    reporter.publish(|p| {
                        let done = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        p.completed = done;
                        Some(BatchEvent::Started {
                            run_id: p.run_id,
                            total: done,
                        })
                    });
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        drop(reporter);

        // Skip the initial Started event
        rx.recv().await.unwrap();
        let mut expected = 1;
        while let Some(BatchEvent::Started { total, .. }) = rx.recv().await {
            assert_eq!(total, expected);
            expected += 1;
        }
        assert_eq!(expected, 201);
    }
}
