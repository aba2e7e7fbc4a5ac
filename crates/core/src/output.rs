//! Destination directory resolution.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the folder created next to sources under [`OutputPolicy::SameAsSource`].
pub const CONVERTED_DIR_NAME: &str = "Converted";

/// Where a run writes its outputs. Resolved once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "path", rename_all = "snake_case")]
pub enum OutputPolicy {
    /// `<source parent>/Converted`.
    #[default]
    SameAsSource,
    /// A single folder for every item.
    Explicit(PathBuf),
}

impl OutputPolicy {
    /// Policy from an optional configured folder.
    pub fn from_folder(folder: Option<PathBuf>) -> Self {
        match folder {
            Some(dir) => Self::Explicit(dir),
            None => Self::SameAsSource,
        }
    }

    /// Human-readable description for status lines.
    pub fn describe(&self) -> String {
        match self {
            Self::SameAsSource => format!("next to source files (./{})", CONVERTED_DIR_NAME),
            Self::Explicit(dir) => dir.display().to_string(),
        }
    }
}

/// Directory that the output for `source` goes into.
///
/// Pure: never touches the filesystem. The target format plays no part.
pub fn resolve(source: &Path, policy: &OutputPolicy) -> PathBuf {
    match policy {
        OutputPolicy::Explicit(dir) => dir.clone(),
        OutputPolicy::SameAsSource => source
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONVERTED_DIR_NAME),
    }
}

/// Creates `dir` and any missing parents.
///
/// Safe to call concurrently for the same directory: an existing directory is
/// not an error.
pub async fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}
