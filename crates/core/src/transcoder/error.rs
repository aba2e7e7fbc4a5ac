//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a transcoder can report for a single item.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Source file vanished between enqueue and dispatch.
    #[error("Source file not found: {path}")]
    NotFound { path: PathBuf },

    /// Source could not be read or decoded.
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// No encoder mapping exists for the requested target, or the encoder
    /// rejected the image data.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Destination could not be written.
    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// The external encoder binary is missing.
    #[error("Transcoder unavailable at path: {path}")]
    TranscoderUnavailable { path: PathBuf },

    /// Encoding did not finish in time.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error not attributable to source or destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a new decode error.
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new write error.
    pub fn write(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable short name, used in outcomes and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Decode { .. } => "decode",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Write { .. } => "write",
            Self::TranscoderUnavailable { .. } => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Io(_) => "io",
        }
    }
}
