//! Batch conversion runs.
//!
//! A [`BatchOrchestrator`] turns a [`BatchRequest`] into a background run:
//!
//! - Items are dispatched in input order, at most `worker_count` at a time.
//! - A failing item is recorded and never stops the others.
//! - Cancellation stops dispatching; in-flight items finish, the rest are
//!   reported as skipped.
//! - Progress is published through the run's [`RunHandle`].
//!
//! # Example
//!
//! ```ignore
//! use prism_core::batch::{BatchOrchestrator, BatchRequest, OrchestratorConfig};
//! use prism_core::media::MediaCategory;
//! use prism_core::transcoder::MediaTranscoder;
//!
//! let orchestrator = BatchOrchestrator::new(
//!     OrchestratorConfig::default(),
//!     MediaTranscoder::with_defaults(),
//! );
//! let handle = orchestrator.submit(BatchRequest::new(paths, MediaCategory::Image, "PNG"))?;
//!
//! let mut progress = handle.subscribe();
//! while progress.changed().await.is_ok() {
//!     println!("{}", progress.borrow().status);
//! }
//! let summary = handle.wait().await?;
//! ```

mod config;
mod handle;
mod orchestrator;
mod state;
mod types;

pub use config::{default_worker_count, OrchestratorConfig};
pub use handle::RunHandle;
pub use orchestrator::{BatchError, BatchOrchestrator};
pub use types::{BatchRequest, ConversionOutcome, ItemReport, RunOutcome, RunSummary};
