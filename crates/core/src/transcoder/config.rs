//! Configuration for the transcoder backends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the image backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// JPEG quality factor (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_jpeg_quality() -> u8 {
    90
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Configuration for the FFmpeg-based audio/video backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Video codec for video targets.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec for video targets.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio codec for MP3 targets.
    #[serde(default = "default_mp3_codec")]
    pub mp3_codec: String,

    /// Encoder speed preset for video targets.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout for a single conversion in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_mp3_codec() -> String {
    "libmp3lame".to_string()
}

fn default_preset() -> String {
    "veryfast".to_string()
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            mp3_codec: default_mp3_codec(),
            preset: default_preset(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
        }
    }
}

impl FfmpegConfig {
    /// Creates a config pointing at a custom ffmpeg binary.
    pub fn with_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FfmpegConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.preset, "veryfast");
        assert_eq!(config.timeout_secs, 3600);
        assert_eq!(ImageConfig::default().jpeg_quality, 90);
    }

    #[test]
    fn test_config_builder() {
        let config =
            FfmpegConfig::with_path(PathBuf::from("/usr/local/bin/ffmpeg")).with_timeout(60);
        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.mp3_codec, "libmp3lame");
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: FfmpegConfig = toml::from_str("preset = \"medium\"").unwrap();
        assert_eq!(config.preset, "medium");
        assert_eq!(config.video_codec, "libx264");
    }
}
