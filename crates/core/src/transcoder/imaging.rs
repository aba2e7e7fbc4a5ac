//! Image backend built on the `image` crate.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageError, ImageReader, ImageResult};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use super::config::ImageConfig;
use super::error::TranscodeError;
use super::staging::StagedOutput;
use super::traits::Transcoder;
use crate::media::{ConversionItem, ImageFormat, TargetFormat};

/// Decodes any image the `image` crate understands and re-encodes it.
#[derive(Debug, Clone)]
pub struct ImageTranscoder {
    config: ImageConfig,
}

impl ImageTranscoder {
    /// Creates a new image transcoder with the given configuration.
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Creates an image transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ImageConfig::default())
    }

    fn decode(source: &Path) -> Result<DynamicImage, TranscodeError> {
        let reader = ImageReader::open(source).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscodeError::NotFound {
                    path: source.to_path_buf(),
                }
            } else {
                TranscodeError::decode(source, e.to_string())
            }
        })?;

        reader
            .with_guessed_format()
            .map_err(|e| TranscodeError::decode(source, e.to_string()))?
            .decode()
            .map_err(|e| TranscodeError::decode(source, e.to_string()))
    }

    fn encode<W: Write + Seek>(
        image: &DynamicImage,
        format: ImageFormat,
        jpeg_quality: u8,
        writer: &mut W,
    ) -> ImageResult<()> {
        match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(writer, jpeg_quality)),
            // PNG has no float sample type
            ImageFormat::Png => match image.color() {
                ColorType::Rgb32F | ColorType::Rgba32F => DynamicImage::ImageRgba8(image.to_rgba8())
                    .write_to(writer, image::ImageFormat::Png),
                _ => image.write_to(writer, image::ImageFormat::Png),
            },
            ImageFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(writer, image::ImageFormat::WebP),
            ImageFormat::Bmp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(writer, image::ImageFormat::Bmp),
        }
    }

    /// Only I/O failures are write errors; an encoder refusing the pixel
    /// data is reported against the target format.
    fn encode_error(path: &Path, format: ImageFormat, error: ImageError) -> TranscodeError {
        match error {
            ImageError::Unsupported(_)
            | ImageError::Encoding(_)
            | ImageError::Parameter(_)
            | ImageError::Limits(_) => TranscodeError::UnsupportedFormat {
                format: format!("{} ({})", format.extension(), error),
            },
            other => TranscodeError::write(path, other.to_string()),
        }
    }

    /// Synchronous conversion, run on the blocking pool.
    fn convert_blocking(
        source: PathBuf,
        dest_dir: PathBuf,
        file_name: std::ffi::OsString,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<PathBuf, TranscodeError> {
        let image = Self::decode(&source)?;

        let stage = StagedOutput::create(&dest_dir, &file_name)?;
        let file = std::fs::File::create(stage.path())
            .map_err(|e| TranscodeError::write(stage.path(), e.to_string()))?;
        let mut writer = BufWriter::new(file);

        Self::encode(&image, format, jpeg_quality, &mut writer)
            .map_err(|e| Self::encode_error(&dest_dir.join(&file_name), format, e))?;
        writer
            .flush()
            .map_err(|e| TranscodeError::write(dest_dir.join(&file_name), e.to_string()))?;
        drop(writer);

        stage.commit()
    }
}

#[async_trait]
impl Transcoder for ImageTranscoder {
    fn name(&self) -> &str {
        "image"
    }

    async fn convert(
        &self,
        item: &ConversionItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let TargetFormat::Image { format } = &item.target else {
            return Err(TranscodeError::UnsupportedFormat {
                format: item.target.to_string(),
            });
        };

        let source = item.source.clone();
        let dest_dir = dest_dir.to_path_buf();
        let file_name = item.output_file_name();
        let format = *format;
        let quality = self.config.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            Self::convert_blocking(source, dest_dir, file_name, format, quality)
        })
        .await
        .map_err(|e| TranscodeError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}
