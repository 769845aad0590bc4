//! Local temporary upload files.
//!
//! A `TempUpload` is consumed by `remove`, so a file handed to the catalog is deleted at most once.
//! A guard that is dropped without being released (e.g. a cancelled request) removes the file
//! synchronously in `Drop`.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    armed: bool,
}

impl TempUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file from disk.
    pub async fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        tokio::fs::remove_file(&self.path).await
    }

    /// Delete the file, logging a failure instead of returning it.
    pub async fn release(self) {
        let path = self.path.clone();
        match self.remove().await {
            Ok(()) => debug!(path = %path.display(), "temp_upload_removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not delete temporary upload"),
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => warn!(path = %self.path.display(), "temporary upload removed on drop"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not delete dropped temporary upload"),
        }
    }
}
