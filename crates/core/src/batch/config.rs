//! Configuration for the batch module.

use serde::{Deserialize, Serialize};

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum items converted at once. Unset means one less than the
    /// number of CPUs, with a floor of 2.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl OrchestratorConfig {
    /// Sets the concurrency bound.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max);
        self
    }

    /// Number of workers a run will use.
    pub fn worker_count(&self) -> usize {
        match self.max_concurrency {
            Some(max) => max.max(1),
            None => default_worker_count(),
        }
    }
}

/// One less than the number of CPUs, never below 2.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(2)
}
