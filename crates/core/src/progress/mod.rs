//! Progress reporting for batch runs.
//!
//! The orchestrator publishes into a [`ProgressReporter`]; observers hold a
//! `tokio::sync::watch` receiver and always see the latest [`RunProgress`].
//! The core never touches a presentation thread: the boundary layer decides
//! how and where to render each update.
//!
//! Observers that need every step rather than the latest value can attach an
//! unbounded [`BatchEvent`] channel. Events are emitted inside the same
//! critical section as the watch update, so their order matches the counter.

mod reporter;
mod types;

pub use reporter::ProgressReporter;
pub use types::{BatchEvent, FailedItem, RunProgress};
