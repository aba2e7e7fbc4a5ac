use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - JPEG quality is within 1..=100
/// - Concurrency, if set, is not 0
/// - FFmpeg binary path, codecs and timeout are set
/// - Output folder, if set, is not an existing file
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !(1..=100).contains(&config.image.jpeg_quality) {
        return Err(ConfigError::ValidationError(format!(
            "image.jpeg_quality must be between 1 and 100, got {}",
            config.image.jpeg_quality
        )));
    }

    if config.orchestrator.max_concurrency == Some(0) {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_concurrency cannot be 0".to_string(),
        ));
    }

    let ffmpeg = &config.ffmpeg;
    if ffmpeg.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "ffmpeg.ffmpeg_path cannot be empty".to_string(),
        ));
    }
    for (key, value) in [
        ("ffmpeg.video_codec", &ffmpeg.video_codec),
        ("ffmpeg.audio_codec", &ffmpeg.audio_codec),
        ("ffmpeg.mp3_codec", &ffmpeg.mp3_codec),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", key)));
        }
    }
    if ffmpeg.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "ffmpeg.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(folder) = &config.output.folder {
        if folder.is_file() {
            return Err(ConfigError::ValidationError(format!(
                "output.folder is a file: {}",
                folder.display()
            )));
        }
    }

    Ok(())
}
