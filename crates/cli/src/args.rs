//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use prism_core::MediaCategory;

/// Convert a batch of images or audio/video files.
#[derive(Debug, Parser)]
#[command(name = "prism", version)]
pub struct Args {
    /// Configuration file. Without it, defaults and PRISM_* variables apply.
    #[arg(short, long, env = "PRISM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Target format tag, e.g. PNG, JPG, mp3, "mkv (Matroska)".
    /// Defaults to the first format of the selected mode.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Which converter to use. Inferred from --format when omitted.
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Write every output into this folder instead of `<source>/Converted`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent conversions.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub metrics: bool,

    /// Files to convert.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Image,
    Media,
}

impl From<Mode> for MediaCategory {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Image => MediaCategory::Image,
            Mode::Media => MediaCategory::AudioVideo,
        }
    }
}

impl Args {
    /// Category for the run: explicit mode, else inferred from the format tag,
    /// else from the first recognizable file, else images.
    pub fn category(&self) -> MediaCategory {
        match (self.mode, &self.format) {
            (Some(mode), _) => mode.into(),
            (None, Some(tag)) => MediaCategory::infer_from_tag(tag),
            (None, None) => self
                .files
                .iter()
                .find_map(|file| MediaCategory::of_path(file))
                .unwrap_or(MediaCategory::Image),
        }
    }

    /// Target format tag for the run.
    pub fn format_tag(&self) -> String {
        self.format
            .clone()
            .unwrap_or_else(|| self.category().default_format().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("prism").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_to_images() {
        let args = parse(&["a.jpg"]);
        assert_eq!(args.category(), MediaCategory::Image);
        assert_eq!(args.format_tag(), MediaCategory::Image.default_format());
        assert_eq!(args.files, vec![PathBuf::from("a.jpg")]);
    }

    #[test]
    fn test_category_inferred_from_files() {
        let args = parse(&["notes.txt", "clip.mkv"]);
        assert_eq!(args.category(), MediaCategory::AudioVideo);
    }

    #[test]
    fn test_category_inferred_from_format() {
        let args = parse(&["--format", "mp3", "song.flac"]);
        assert_eq!(args.category(), MediaCategory::AudioVideo);
        assert_eq!(args.format_tag(), "mp3");
    }

    #[test]
    fn test_explicit_mode_wins() {
        let args = parse(&["--mode", "media", "clip.avi"]);
        assert_eq!(args.category(), MediaCategory::AudioVideo);
        assert_eq!(args.format_tag(), MediaCategory::AudioVideo.default_format());
    }

    #[test]
    fn test_files_required() {
        assert!(Args::try_parse_from(["prism", "--format", "PNG"]).is_err());
    }

    #[test]
    fn test_options() {
        let args = parse(&["-j", "3", "-o", "/out", "--metrics", "--json", "x.png", "y.png"]);
        assert_eq!(args.jobs, Some(3));
        assert_eq!(args.output, Some(PathBuf::from("/out")));
        assert!(args.metrics);
        assert!(args.json);
        assert_eq!(args.files.len(), 2);
    }
}
