//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use prism_core::batch::{BatchOrchestrator, OrchestratorConfig};
//! use prism_core::testing::MockTranscoder;
//!
//! let transcoder = MockTranscoder::new();
//! let orchestrator = BatchOrchestrator::new(OrchestratorConfig::default(), transcoder.clone());
//! ```

mod mock_transcoder;

pub use mock_transcoder::{MockTranscoder, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageBuffer, Rgb};
    use std::path::{Path, PathBuf};

    /// Write a small gradient PNG to `dir/name` and return its path.
    pub fn png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
        });
        img.save(&path)
            .unwrap_or_else(|e| panic!("failed to write fixture {}: {}", path.display(), e));
        path
    }

    /// Write a file with garbage content that no decoder accepts.
    pub fn corrupt(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"definitely not an image")
            .unwrap_or_else(|e| panic!("failed to write fixture {}: {}", path.display(), e));
        path
    }
}
