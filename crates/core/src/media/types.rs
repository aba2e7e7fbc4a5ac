//! Types for the media module.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Format tags offered for image batches.
pub const IMAGE_FORMATS: &[&str] = &["JPG", "PNG", "WEBP", "BMP"];

/// Format tags offered for audio/video batches.
pub const AUDIO_VIDEO_FORMATS: &[&str] = &["MP4", "AVI", "MOV", "MP3", "WAV"];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff", "ico", "tga", "pnm",
];

const AUDIO_VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "webm", "wmv", "m4v", "mp3", "wav", "flac", "m4a", "ogg",
    "aac", "opus",
];

/// The two disjoint kinds of input a batch can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    /// Still images, handled by the image codec backend.
    Image,
    /// Audio and video files, handled by ffmpeg.
    AudioVideo,
}

impl MediaCategory {
    /// Short plural label used in counts ("3 images", "2 media").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::AudioVideo => "media",
        }
    }

    /// The format tags selectable for this category.
    pub fn available_formats(&self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_FORMATS,
            Self::AudioVideo => AUDIO_VIDEO_FORMATS,
        }
    }

    /// The format tag selected when the user picks nothing.
    pub fn default_format(&self) -> &'static str {
        self.available_formats()[0]
    }

    /// Guesses the category a format tag belongs to.
    ///
    /// Known image tags map to [`MediaCategory::Image`]; everything else is
    /// treated as an audio/video target.
    pub fn infer_from_tag(tag: &str) -> Self {
        if ImageFormat::from_tag(tag).is_some() {
            Self::Image
        } else {
            Self::AudioVideo
        }
    }

    /// Classifies a source file by its extension.
    pub fn of_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if AUDIO_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::AudioVideo)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::AudioVideo => write!(f, "audio/video"),
        }
    }
}

/// Image encoders supported as conversion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Parses a tag case-insensitively. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Parses a tag, falling back to JPEG for anything unrecognised.
    pub fn from_tag_or_default(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::Jpeg)
    }

    /// Returns the file extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }
}

/// How ffmpeg should treat an audio/video target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvKind {
    /// MP3 container with an MP3 audio codec.
    Mp3,
    /// WAV container.
    Wav,
    /// Video re-encode into the container named by the extension.
    Video,
}

/// An audio/video target: the real extension plus its encoding strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvFormat {
    extension: String,
    kind: AvKind,
}

impl AvFormat {
    /// Parses a possibly descriptive tag such as `"MP4 (Video)"`.
    ///
    /// Only the leading token before the first space is meaningful. An empty
    /// token falls back to `mp4`.
    pub fn from_tag(tag: &str) -> Self {
        let token = tag
            .trim()
            .split(' ')
            .next()
            .unwrap_or_default()
            .trim_start_matches('.')
            .to_ascii_lowercase();
        let extension = if token.is_empty() {
            "mp4".to_string()
        } else {
            token
        };
        let kind = match extension.as_str() {
            "mp3" => AvKind::Mp3,
            "wav" => AvKind::Wav,
            _ => AvKind::Video,
        };
        Self { extension, kind }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> AvKind {
        self.kind
    }
}

/// The single output format applied to every item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum TargetFormat {
    Image { format: ImageFormat },
    AudioVideo { format: AvFormat },
}

impl TargetFormat {
    /// Parses a user-facing tag in the context of a category.
    pub fn parse(category: MediaCategory, tag: &str) -> Self {
        match category {
            MediaCategory::Image => Self::Image {
                format: ImageFormat::from_tag_or_default(tag),
            },
            MediaCategory::AudioVideo => Self::AudioVideo {
                format: AvFormat::from_tag(tag),
            },
        }
    }

    pub fn category(&self) -> MediaCategory {
        match self {
            Self::Image { .. } => MediaCategory::Image,
            Self::AudioVideo { .. } => MediaCategory::AudioVideo,
        }
    }

    /// Extension of the files this target produces.
    pub fn extension(&self) -> &str {
        match self {
            Self::Image { format } => format.extension(),
            Self::AudioVideo { format } => format.extension(),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_ascii_uppercase())
    }
}

/// One source file queued for conversion. Immutable once dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionItem {
    /// Path of the file to convert.
    pub source: PathBuf,
    /// Format to convert into.
    pub target: TargetFormat,
}

impl ConversionItem {
    pub fn new(source: impl Into<PathBuf>, target: TargetFormat) -> Self {
        Self {
            source: source.into(),
            target,
        }
    }

    pub fn category(&self) -> MediaCategory {
        self.target.category()
    }

    /// `<source stem>.<target extension>`, the name of the produced file.
    pub fn output_file_name(&self) -> OsString {
        let mut name = self
            .source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| OsString::from("output"));
        name.push(".");
        name.push(self.target.extension());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpg_and_jpeg_share_extension() {
        assert_eq!(ImageFormat::from_tag("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_tag("JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_tag_or_default("JPG").extension(), "jpeg");
        assert_eq!(ImageFormat::from_tag_or_default("jpeg").extension(), "jpeg");
    }

    #[test]
    fn test_unknown_image_tag_falls_back_to_jpeg() {
        assert_eq!(ImageFormat::from_tag("tiff"), None);
        assert_eq!(ImageFormat::from_tag_or_default("tiff"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_tag_or_default(""), ImageFormat::Jpeg);
    }

    #[test]
    fn test_av_tag_uses_leading_token() {
        let format = AvFormat::from_tag("MP4 (Video)");
        assert_eq!(format.extension(), "mp4");
        assert_eq!(format.kind(), AvKind::Video);

        assert_eq!(AvFormat::from_tag("MP3").kind(), AvKind::Mp3);
        assert_eq!(AvFormat::from_tag("wav (audio)").kind(), AvKind::Wav);
        assert_eq!(AvFormat::from_tag("MOV").extension(), "mov");
    }

    #[test]
    fn test_empty_av_tag_defaults_to_mp4() {
        let format = AvFormat::from_tag("   ");
        assert_eq!(format.extension(), "mp4");
        assert_eq!(format.kind(), AvKind::Video);
    }

    #[test]
    fn test_infer_category_from_tag() {
        assert_eq!(MediaCategory::infer_from_tag("PNG"), MediaCategory::Image);
        assert_eq!(MediaCategory::infer_from_tag("jpg"), MediaCategory::Image);
        assert_eq!(
            MediaCategory::infer_from_tag("MP4 (Video)"),
            MediaCategory::AudioVideo
        );
    }

    #[test]
    fn test_category_of_path() {
        assert_eq!(
            MediaCategory::of_path(Path::new("/a/photo.JPG")),
            Some(MediaCategory::Image)
        );
        assert_eq!(
            MediaCategory::of_path(Path::new("/a/clip.mkv")),
            Some(MediaCategory::AudioVideo)
        );
        assert_eq!(MediaCategory::of_path(Path::new("/a/notes.txt")), None);
        assert_eq!(MediaCategory::of_path(Path::new("/a/noext")), None);
    }

    #[test]
    fn test_output_file_name() {
        let item = ConversionItem::new(
            "/photos/holiday.beach.png",
            TargetFormat::parse(MediaCategory::Image, "jpg"),
        );
        assert_eq!(item.output_file_name(), OsString::from("holiday.beach.jpeg"));

        let item = ConversionItem::new(
            "/videos/clip.mkv",
            TargetFormat::parse(MediaCategory::AudioVideo, "MP4 (Video)"),
        );
        assert_eq!(item.output_file_name(), OsString::from("clip.mp4"));
        assert_eq!(item.category(), MediaCategory::AudioVideo);
    }

    #[test]
    fn test_target_format_serialization() {
        let target = TargetFormat::parse(MediaCategory::Image, "webp");
        let json = serde_json::to_string(&target).unwrap();
        assert!(json.contains("\"category\":\"image\""));
        assert!(json.contains("\"format\":\"webp\""));
        assert_eq!(target.to_string(), "WEBP");
    }
}
