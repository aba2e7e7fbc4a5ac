//! Types for the progress module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::batch::{ConversionOutcome, ItemReport, RunOutcome, RunSummary};

/// A failed item, kept so observers can list what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub source: PathBuf,
    pub reason: String,
}

/// Read projection of a run's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProgress {
    /// Run this progress belongs to.
    pub run_id: Uuid,
    /// Items settled so far (converted or failed). Reset to 0 on cancel.
    pub completed: usize,
    /// Items in the run.
    pub total: usize,
    /// Human-readable status line.
    pub status: String,
    /// Set once the run has finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<RunOutcome>,
    /// Items that failed so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedItem>,
}

impl RunProgress {
    pub(crate) fn new(run_id: Uuid, total: usize) -> Self {
        Self {
            run_id,
            completed: 0,
            total,
            status: format!("Converting 0 of {}", total),
            terminal: None,
            failures: Vec::new(),
        }
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Completed percentage in `0.0..=100.0`.
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn is_finished(&self) -> bool {
        self.terminal.is_some()
    }

    pub(crate) fn apply_item(&mut self, completed: usize, report: &ItemReport) {
        self.completed = completed;
        self.status = format!("Done: {} of {}", completed, self.total);
        if let ConversionOutcome::Failed { reason, .. } = &report.outcome {
            self.failures.push(FailedItem {
                source: report.source.clone(),
                reason: reason.clone(),
            });
        }
    }

    pub(crate) fn apply_outcome(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Success => {
                self.completed = self.total;
                self.status = "Completed successfully".to_string();
            }
            RunOutcome::CompletedWithErrors => {
                self.completed = self.total;
                self.status = format!("Completed with {} error(s)", self.failures.len());
            }
            RunOutcome::Cancelled => {
                self.completed = 0;
                self.status = "Cancelled".to_string();
            }
        }
        self.terminal = Some(outcome);
    }
}

/// Step-by-step notifications for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// The run was accepted and is about to dispatch.
    Started { run_id: Uuid, total: usize },
    /// One item settled.
    ItemFinished {
        run_id: Uuid,
        completed: usize,
        total: usize,
        report: ItemReport,
    },
    /// The run reached a terminal state.
    Finished { summary: RunSummary },
}
