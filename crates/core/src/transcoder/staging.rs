//! Temp-file-then-rename output staging.
//!
//! Encoders write into a hidden sibling of the final destination. The file
//! only appears under its real name once [`StagedOutput::commit`] succeeds;
//! dropping an uncommitted stage removes the partial file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use super::error::TranscodeError;

pub(crate) struct StagedOutput {
    temp: TempPath,
    destination: PathBuf,
}

impl StagedOutput {
    /// Reserves a temp file in `dest_dir` for the output named `file_name`.
    ///
    /// The temp file keeps the real extension so encoders that infer the
    /// container from the name still pick the right one.
    pub(crate) fn create(dest_dir: &Path, file_name: &OsStr) -> Result<Self, TranscodeError> {
        let destination = dest_dir.join(file_name);
        let suffix = Path::new(file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix(".prism-").suffix(&suffix);
        // Same mode as a plain File::create (umask still applies), not 0600
        #[cfg(unix)]
        builder.permissions(std::os::unix::fs::PermissionsExt::from_mode(0o666));

        let temp = builder
            .tempfile_in(dest_dir)
            .map_err(|e| TranscodeError::write(&destination, e.to_string()))?
            .into_temp_path();

        Ok(Self { temp, destination })
    }

    /// Where the encoder should write.
    pub(crate) fn path(&self) -> &Path {
        &self.temp
    }

    /// Moves the finished file to its final name, replacing any existing file.
    pub(crate) fn commit(self) -> Result<PathBuf, TranscodeError> {
        let Self { temp, destination } = self;
        temp.persist(&destination)
            .map_err(|e| TranscodeError::write(&destination, e.error.to_string()))?;
        Ok(destination)
    }
}
