//! Types for the batch module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::media::MediaCategory;
use crate::output::OutputPolicy;
use crate::progress::BatchEvent;

/// What happened to a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The output file was written.
    Converted { destination: PathBuf },
    /// The item could not be converted.
    Failed {
        /// Short machine-readable failure kind (e.g. "not_found", "decode").
        kind: String,
        reason: String,
    },
    /// The item was never started.
    Skipped { reason: String },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converted { .. } => "converted",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Per-item result, in input order within a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Position of the item in the submitted list.
    pub index: usize,
    pub source: PathBuf,
    pub outcome: ConversionOutcome,
    /// Wall time spent on the item (0 for skipped items).
    pub elapsed_ms: u64,
}

impl ItemReport {
    pub(crate) fn skipped(index: usize, source: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            index,
            source,
            outcome: ConversionOutcome::Skipped {
                reason: reason.into(),
            },
            elapsed_ms: 0,
        }
    }

    pub(crate) fn failed(
        index: usize,
        source: PathBuf,
        kind: impl Into<String>,
        reason: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            index,
            source,
            outcome: ConversionOutcome::Failed {
                kind: kind.into(),
                reason: reason.into(),
            },
            elapsed_ms,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every item converted.
    Success,
    /// Cancellation was requested before the run settled.
    Cancelled,
    /// At least one item failed.
    CompletedWithErrors,
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::CompletedWithErrors => "completed_with_errors",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final account of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// One report per submitted item, in input order.
    pub items: Vec<ItemReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub(crate) fn from_reports(
        run_id: Uuid,
        outcome: RunOutcome,
        items: Vec<ItemReport>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let count = |f: fn(&ConversionOutcome) -> bool| items.iter().filter(|r| f(&r.outcome)).count();
        let converted = count(ConversionOutcome::is_converted);
        let failed = count(ConversionOutcome::is_failed);
        let skipped = count(ConversionOutcome::is_skipped);
        Self {
            run_id,
            outcome,
            total: items.len(),
            converted,
            failed,
            skipped,
            items,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Reports of failed items.
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|r| r.outcome.is_failed())
    }
}

/// A batch submission.
///
/// `target_format` is the user-facing tag ("PNG", "mp3", "mkv (Matroska)").
/// It is resolved against `category` when the request is submitted.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub paths: Vec<PathBuf>,
    pub category: MediaCategory,
    pub target_format: String,
    pub output_policy: OutputPolicy,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) events: Option<mpsc::UnboundedSender<BatchEvent>>,
}

impl BatchRequest {
    pub fn new(
        paths: Vec<PathBuf>,
        category: MediaCategory,
        target_format: impl Into<String>,
    ) -> Self {
        Self {
            paths,
            category,
            target_format: target_format.into(),
            output_policy: OutputPolicy::default(),
            cancellation: None,
            events: None,
        }
    }

    /// Sets where outputs are written.
    pub fn with_output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = policy;
        self
    }

    /// Ties the run to an external cancellation token.
    ///
    /// The run uses a child token, so cancelling the run does not cancel the
    /// parent.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Streams a [`BatchEvent`] for every step of the run.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }
}
