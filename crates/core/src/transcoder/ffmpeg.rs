//! FFmpeg-based audio/video backend.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::FfmpegConfig;
use super::error::TranscodeError;
use super::staging::StagedOutput;
use super::traits::Transcoder;
use crate::media::{AvFormat, AvKind, ConversionItem, TargetFormat};

/// FFmpeg-based transcoder implementation.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FfmpegConfig::default())
    }

    /// Builds ffmpeg arguments for one conversion.
    fn build_args(&self, input_path: &Path, output_path: &Path, format: &AvFormat) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        match format.kind() {
            AvKind::Mp3 => args.extend([
                "-vn".to_string(),
                "-c:a".to_string(),
                self.config.mp3_codec.clone(),
                "-f".to_string(),
                "mp3".to_string(),
            ]),
            AvKind::Wav => args.extend(["-vn".to_string(), "-f".to_string(), "wav".to_string()]),
            AvKind::Video => args.extend([
                "-c:v".to_string(),
                self.config.video_codec.clone(),
                "-c:a".to_string(),
                self.config.audio_codec.clone(),
                "-preset".to_string(),
                self.config.preset.clone(),
            ]),
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ]);

        // Output
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Condenses ffmpeg's stderr into a one-line failure reason.
    fn failure_reason(stderr: &str, code: Option<i32>) -> String {
        let errors: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| line.to_ascii_lowercase().contains("error"))
            .collect();

        if !errors.is_empty() {
            return errors.join("; ");
        }

        stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("FFmpeg exited with code: {:?}", code))
    }

    fn spawn_error(&self, e: std::io::Error) -> TranscodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscodeError::TranscoderUnavailable {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscodeError::Io(e)
        }
    }

    async fn run_ffmpeg(&self, args: &[String], input_path: &Path) -> Result<(), TranscodeError> {
        let child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Dropping the child on timeout kills the process
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(TranscodeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::decode(
                input_path,
                Self::failure_reason(&stderr, output.status.code()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(
        &self,
        item: &ConversionItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let TargetFormat::AudioVideo { format } = &item.target else {
            return Err(TranscodeError::UnsupportedFormat {
                format: item.target.to_string(),
            });
        };

        if !tokio::fs::try_exists(&item.source).await.unwrap_or(false) {
            return Err(TranscodeError::NotFound {
                path: item.source.clone(),
            });
        }

        let stage = StagedOutput::create(dest_dir, &item.output_file_name())?;
        let args = self.build_args(&item.source, stage.path(), format);

        tracing::debug!(
            input = %item.source.display(),
            format = %format.extension(),
            "Running ffmpeg"
        );
        self.run_ffmpeg(&args, &item.source).await?;

        stage.commit()
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscodeError::TranscoderUnavailable {
                path: self.config.ffmpeg_path.clone(),
            });
        }

        Ok(())
    }
}
