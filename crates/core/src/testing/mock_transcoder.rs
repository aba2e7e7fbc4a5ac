//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::media::{ConversionItem, TargetFormat};
use crate::transcoder::{TranscodeError, Transcoder};

/// A recorded conversion for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// Source file of the item.
    pub source: PathBuf,
    /// Requested target.
    pub target: TargetFormat,
    /// Directory the orchestrator asked to write into.
    pub dest_dir: PathBuf,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track conversions for assertions
/// - Fail or panic on specific sources
/// - Simulate conversion time
/// - Observe peak concurrency
///
/// Clones share state, so a test can keep one clone and hand another to the
/// orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use prism_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new();
/// transcoder.fail_on("/in/bad.png", "corrupt header").await;
/// transcoder.set_conversion_duration(Duration::from_millis(20)).await;
///
/// // ... run a batch ...
///
/// assert_eq!(transcoder.conversion_count().await, 3);
/// assert!(transcoder.max_in_flight() <= 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Sources that fail, with the failure reason.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Sources that make the transcoder panic.
    panics: Arc<RwLock<HashSet<PathBuf>>>,
    /// If set, the next conversion fails with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    /// Simulated conversion duration in milliseconds.
    conversion_duration_ms: Arc<RwLock<u64>>,
    /// Whether successful conversions create the output file.
    write_outputs: Arc<RwLock<bool>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even if the conversion panics.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            panics: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            conversion_duration_ms: Arc::new(RwLock::new(0)),
            write_outputs: Arc::new(RwLock::new(true)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded conversions, in call order.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make conversions of `path` fail with a decode error.
    pub async fn fail_on(&self, path: impl AsRef<Path>, reason: impl Into<String>) {
        self.failures
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), reason.into());
    }

    /// Make conversions of `path` panic.
    pub async fn panic_on(&self, path: impl AsRef<Path>) {
        self.panics.write().await.insert(path.as_ref().to_path_buf());
    }

    /// Configure the next conversion to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Enable or disable writing output files.
    pub async fn set_write_outputs(&self, write: bool) {
        *self.write_outputs.write().await = write;
    }

    /// Highest number of concurrent conversions observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, item: &ConversionItem, dest_dir: &Path, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            source: item.source.clone(),
            target: item.target.clone(),
            dest_dir: dest_dir.to_path_buf(),
            success,
        });
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        item: &ConversionItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));

        let duration_ms = *self.conversion_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if self.panics.read().await.contains(&item.source) {
            self.record(item, dest_dir, false).await;
            panic!("mock transcoder panic on {}", item.source.display());
        }

        let error = match self.next_error.write().await.take() {
            Some(err) => Some(err),
            None => self
                .failures
                .read()
                .await
                .get(&item.source)
                .map(|reason| TranscodeError::decode(&item.source, reason.clone())),
        };
        if let Some(err) = error {
            self.record(item, dest_dir, false).await;
            return Err(err);
        }

        let destination = dest_dir.join(item.output_file_name());
        if *self.write_outputs.read().await {
            tokio::fs::write(&destination, b"converted")
                .await
                .map_err(|e| TranscodeError::write(&destination, e.to_string()))?;
        }

        self.record(item, dest_dir, true).await;
        Ok(destination)
    }
}
