//! Transcoder module: the per-file conversion capability.
//!
//! This module provides the `Transcoder` trait and the backends that implement
//! it. The orchestrator only ever sees the trait, so tests can swap in
//! [`crate::testing::MockTranscoder`] without touching real codecs.
//!
//! # Backends
//!
//! - [`ImageTranscoder`]: decodes with the `image` crate and re-encodes to
//!   JPEG (quality 90 by default), PNG, WebP or BMP
//! - [`FfmpegTranscoder`]: shells out to ffmpeg for MP3, WAV and video targets
//! - [`MediaTranscoder`]: routes an item to one of the above by category
//!
//! Every backend writes to a hidden temp file next to the destination and
//! renames it into place on success, so a failed item never leaves a partial
//! file under the final name.
//!
//! # Example
//!
//! ```ignore
//! use prism_core::transcoder::{MediaTranscoder, Transcoder};
//! use prism_core::media::{ConversionItem, MediaCategory, TargetFormat};
//!
//! let transcoder = MediaTranscoder::with_defaults();
//! let item = ConversionItem::new(
//!     "/photos/cat.bmp",
//!     TargetFormat::parse(MediaCategory::Image, "PNG"),
//! );
//! let written = transcoder.convert(&item, Path::new("/photos/Converted")).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod imaging;
mod media;
mod staging;
mod traits;

pub use config::{FfmpegConfig, ImageConfig};
pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;
pub use imaging::ImageTranscoder;
pub use media::MediaTranscoder;
pub use traits::Transcoder;
