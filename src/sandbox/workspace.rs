//! Per-call staging directories.
//!
//! Every execution gets a fresh, uniquely named directory on the host that
//! holds exactly one file, the submitted script. The directory is bind-mounted
//! read-write into the container and removed when the [`StagingDir`] is
//! dropped, so early returns, failures and cancelled calls all clean up.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use super::config::SCRIPT_FILE_NAME;
use crate::error::SandboxError;

/// A temporary directory containing the staged script.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Creates a new, empty staging directory under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::StagingFailed` if the directory cannot be created.
    pub fn create(prefix: &str) -> Result<Self, SandboxError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(SandboxError::StagingFailed)?;

        debug!(path = %dir.path().display(), "Created staging directory");
        Ok(Self { dir })
    }

    /// Creates a staging directory and writes `code` into it verbatim.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::StagingFailed` or `SandboxError::WriteFailed`.
    /// If the write fails the directory is removed before returning.
    #[instrument(skip(code), fields(code_len = code.len()))]
    pub fn with_script(prefix: &str, code: &str) -> Result<Self, SandboxError> {
        let staging = Self::create(prefix)?;
        staging.write_script(code)?;
        Ok(staging)
    }

    /// Writes the script file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::WriteFailed` on I/O failure.
    pub fn write_script(&self, code: &str) -> Result<(), SandboxError> {
        fs::write(self.script_path(), code).map_err(SandboxError::WriteFailed)
    }

    /// Host path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Host path of the staged script.
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.dir.path().join(SCRIPT_FILE_NAME)
    }

    /// `-v` argument mounting this directory read-write at `mount_point`.
    #[must_use]
    pub fn volume_spec(&self, mount_point: &str) -> String {
        format!("{}:{}", self.dir.path().display(), mount_point)
    }

    /// Removes the directory now, logging instead of failing on error.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "Removed staging directory"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staging directory"),
        }
    }
}
