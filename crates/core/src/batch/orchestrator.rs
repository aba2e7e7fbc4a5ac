//! Bounded-concurrency batch orchestrator.

use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::OrchestratorConfig;
use super::handle::RunHandle;
use super::state::RunState;
use super::types::{BatchRequest, ConversionOutcome, ItemReport, RunOutcome, RunSummary};
use crate::media::{ConversionItem, MediaCategory, TargetFormat};
use crate::metrics;
use crate::output::{self, OutputPolicy};
use crate::queue::JobQueue;
use crate::transcoder::{TranscodeError, Transcoder};

/// Reason recorded for items abandoned by cancellation.
const CANCELLED_REASON: &str = "cancelled";

/// Errors returned when submitting a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The submission held no paths.
    #[error("Nothing to do: no files were queued")]
    NothingToDo,

    /// The run task ended without producing a summary.
    #[error("Run aborted: {0}")]
    Aborted(String),
}

/// Runs batches of conversions with at most `worker_count` items in flight.
///
/// Each submission becomes an independent run with its own progress channel
/// and cancellation token. Item failures are recorded and never stop the
/// rest of the batch.
pub struct BatchOrchestrator<T: Transcoder + 'static> {
    config: OrchestratorConfig,
    transcoder: Arc<T>,
}

impl<T: Transcoder + 'static> BatchOrchestrator<T> {
    pub fn new(config: OrchestratorConfig, transcoder: T) -> Self {
        Self {
            config,
            transcoder: Arc::new(transcoder),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Starts a run in the background.
    ///
    /// Must be called from within a tokio runtime. Returns
    /// [`BatchError::NothingToDo`] for an empty path list.
    pub fn submit(&self, request: BatchRequest) -> Result<RunHandle, BatchError> {
        if request.paths.is_empty() {
            info!(category = %request.category, "Nothing to convert");
            return Err(BatchError::NothingToDo);
        }

        let target = TargetFormat::parse(request.category, &request.target_format);
        let items: Vec<ConversionItem> = request
            .paths
            .into_iter()
            .map(|path| ConversionItem::new(path, target.clone()))
            .collect();

        let cancel = match request.cancellation {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let run_id = Uuid::new_v4();
        let total = items.len();
        let state = Arc::new(RunState::new(run_id, total, cancel.clone(), request.events));
        let progress = state.subscribe();
        let workers = self.config.worker_count();

        info!(
            run_id = %run_id,
            total,
            workers,
            target = %target,
            output = %request.output_policy.describe(),
            "Starting batch run"
        );

        let task = tokio::spawn(run_batch(
            state,
            items,
            request.output_policy,
            Arc::clone(&self.transcoder),
            workers,
        ));

        Ok(RunHandle::new(run_id, total, cancel, progress, task))
    }

    /// Starts a run over a snapshot of one of the queue's lists.
    ///
    /// Later changes to the queue do not affect the run.
    pub fn submit_queue(
        &self,
        queue: &JobQueue,
        category: MediaCategory,
        target_format: impl Into<String>,
        output_policy: OutputPolicy,
    ) -> Result<RunHandle, BatchError> {
        let request = BatchRequest::new(queue.snapshot(category), category, target_format)
            .with_output_policy(output_policy);
        self.submit(request)
    }
}

/// Dispatches items in input order, then waits for all workers to settle.
async fn run_batch<T: Transcoder + 'static>(
    state: Arc<RunState>,
    items: Vec<ConversionItem>,
    policy: OutputPolicy,
    transcoder: Arc<T>,
    workers: usize,
) -> RunSummary {
    let started_at = Utc::now();
    let sources: Vec<PathBuf> = items.iter().map(|item| item.source.clone()).collect();
    let mut reports: Vec<Option<ItemReport>> = (0..items.len()).map(|_| None).collect();
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    let mut pending = items.into_iter().enumerate();
    for (index, item) in pending.by_ref() {
        let permit = tokio::select! {
            biased;
            _ = state.cancel.cancelled() => None,
            permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            reports[index] = Some(ItemReport::skipped(index, item.source, CANCELLED_REASON));
            break;
        };

        let state = Arc::clone(&state);
        let transcoder = Arc::clone(&transcoder);
        let policy = policy.clone();
        tasks.spawn(async move {
            let _permit = permit;
            process_item(&state, transcoder.as_ref(), index, item, &policy).await
        });
    }

    let abandoned = pending.len();
    for (index, item) in pending {
        reports[index] = Some(ItemReport::skipped(index, item.source, CANCELLED_REASON));
    }
    if abandoned > 0 {
        info!(run_id = %state.id, abandoned, "Cancellation requested, remaining items skipped");
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => {
                let index = report.index;
                reports[index] = Some(report);
            }
            Err(e) => error!(run_id = %state.id, error = %e, "Worker task failed"),
        }
    }

    let items: Vec<ItemReport> = reports
        .into_iter()
        .zip(sources)
        .enumerate()
        .map(|(index, (report, source))| {
            report.unwrap_or_else(|| {
                ItemReport::failed(index, source, "aborted", "worker task aborted", 0)
            })
        })
        .collect();

    let outcome = if state.cancel.is_cancelled() {
        RunOutcome::Cancelled
    } else if items.iter().any(|r| r.outcome.is_failed()) {
        RunOutcome::CompletedWithErrors
    } else {
        RunOutcome::Success
    };

    let summary = RunSummary::from_reports(state.id, outcome, items, started_at);
    state.finish(&summary);
    metrics::RUNS_TOTAL
        .with_label_values(&[outcome.label()])
        .inc();

    match outcome {
        RunOutcome::Success => info!(
            run_id = %summary.run_id,
            converted = summary.converted,
            duration_ms = summary.duration_ms(),
            "Batch run completed"
        ),
        RunOutcome::CompletedWithErrors => warn!(
            run_id = %summary.run_id,
            converted = summary.converted,
            failed = summary.failed,
            duration_ms = summary.duration_ms(),
            "Batch run completed with errors"
        ),
        RunOutcome::Cancelled => info!(
            run_id = %summary.run_id,
            converted = summary.converted,
            skipped = summary.skipped,
            "Batch run cancelled"
        ),
    }

    summary
}

/// Converts one item and records it. Never fails: errors and panics become
/// a `Failed` report.
async fn process_item<T: Transcoder>(
    state: &RunState,
    transcoder: &T,
    index: usize,
    item: ConversionItem,
    policy: &OutputPolicy,
) -> ItemReport {
    // Dispatched before cancellation was observed but not yet started
    if state.cancel.is_cancelled() {
        return ItemReport::skipped(index, item.source, CANCELLED_REASON);
    }

    let category = item.category();
    let start = Instant::now();
    metrics::CONVERSIONS_IN_FLIGHT.inc();
    let result = AssertUnwindSafe(convert_one(transcoder, &item, policy))
        .catch_unwind()
        .await;
    metrics::CONVERSIONS_IN_FLIGHT.dec();
    let elapsed = start.elapsed();

    let outcome = match result {
        Ok(Ok(destination)) => {
            debug!(
                run_id = %state.id,
                source = %item.source.display(),
                destination = %destination.display(),
                "Item converted"
            );
            ConversionOutcome::Converted { destination }
        }
        Ok(Err(e)) => {
            warn!(
                run_id = %state.id,
                source = %item.source.display(),
                kind = e.kind(),
                error = %e,
                "Item failed"
            );
            ConversionOutcome::Failed {
                kind: e.kind().to_string(),
                reason: e.to_string(),
            }
        }
        Err(_) => {
            error!(
                run_id = %state.id,
                source = %item.source.display(),
                transcoder = transcoder.name(),
                "Transcoder panicked"
            );
            ConversionOutcome::Failed {
                kind: "panic".to_string(),
                reason: format!("{} transcoder panicked", transcoder.name()),
            }
        }
    };

    metrics::CONVERSIONS_TOTAL
        .with_label_values(&[outcome.label()])
        .inc();
    metrics::CONVERSION_DURATION
        .with_label_values(&[category.label()])
        .observe(elapsed.as_secs_f64());

    let report = ItemReport {
        index,
        source: item.source,
        outcome,
        elapsed_ms: elapsed.as_millis() as u64,
    };
    let completed = state.record_item(&report);
    debug!(run_id = %state.id, completed, total = state.total, "Progress");
    report
}

/// Checks the source, prepares the output directory and runs the transcoder.
async fn convert_one<T: Transcoder>(
    transcoder: &T,
    item: &ConversionItem,
    policy: &OutputPolicy,
) -> Result<PathBuf, TranscodeError> {
    if !tokio::fs::try_exists(&item.source).await.unwrap_or(false) {
        return Err(TranscodeError::NotFound {
            path: item.source.clone(),
        });
    }

    let dest_dir = output::resolve(&item.source, policy);
    output::ensure_dir(&dest_dir)
        .await
        .map_err(|e| TranscodeError::write(&dest_dir, e.to_string()))?;

    transcoder.convert(item, &dest_dir).await
}
