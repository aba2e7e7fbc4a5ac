//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::TranscodeError;
use crate::media::ConversionItem;

/// A backend that converts one file into the batch's target format.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Converts `item` and writes `<stem>.<ext>` into `dest_dir`.
    ///
    /// `dest_dir` must already exist. Returns the path of the written file.
    async fn convert(
        &self,
        item: &ConversionItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaCategory, TargetFormat};

    struct EchoTranscoder;

    #[async_trait]
    impl Transcoder for EchoTranscoder {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert(
            &self,
            item: &ConversionItem,
            dest_dir: &Path,
        ) -> Result<PathBuf, TranscodeError> {
            Ok(dest_dir.join(item.output_file_name()))
        }
    }

    #[tokio::test]
    async fn test_default_validate_succeeds() {
        assert!(EchoTranscoder.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_trait_object_convert() {
        let transcoder: Box<dyn Transcoder> = Box::new(EchoTranscoder);
        let item = ConversionItem::new(
            "/in/a.bmp",
            TargetFormat::parse(MediaCategory::Image, "png"),
        );
        let out = transcoder.convert(&item, Path::new("/out")).await.unwrap();
        assert_eq!(out, PathBuf::from("/out/a.png"));
        assert_eq!(transcoder.name(), "echo");
    }
}
