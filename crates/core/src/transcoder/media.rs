//! The uniform adapter used by the orchestrator.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::config::{FfmpegConfig, ImageConfig};
use super::error::TranscodeError;
use super::ffmpeg::FfmpegTranscoder;
use super::imaging::ImageTranscoder;
use super::traits::Transcoder;
use crate::media::{ConversionItem, MediaCategory};

/// Routes images to the `image` backend and audio/video to ffmpeg.
#[derive(Debug, Clone)]
pub struct MediaTranscoder {
    image: ImageTranscoder,
    ffmpeg: FfmpegTranscoder,
}

impl MediaTranscoder {
    pub fn new(image_config: ImageConfig, ffmpeg_config: FfmpegConfig) -> Self {
        Self {
            image: ImageTranscoder::new(image_config),
            ffmpeg: FfmpegTranscoder::new(ffmpeg_config),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ImageConfig::default(), FfmpegConfig::default())
    }

    /// Checks only the backend a batch of `category` will use.
    pub async fn validate_for(&self, category: MediaCategory) -> Result<(), TranscodeError> {
        match category {
            MediaCategory::Image => self.image.validate().await,
            MediaCategory::AudioVideo => self.ffmpeg.validate().await,
        }
    }
}

#[async_trait]
impl Transcoder for MediaTranscoder {
    fn name(&self) -> &str {
        "media"
    }

    async fn convert(
        &self,
        item: &ConversionItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        match item.category() {
            MediaCategory::Image => self.image.convert(item, dest_dir).await,
            MediaCategory::AudioVideo => self.ffmpeg.convert(item, dest_dir).await,
        }
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        self.image.validate().await?;
        self.ffmpeg.validate().await
    }
}
