use super::error::MediaError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Owns a per-request download directory and removes it on drop.
///
/// Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct DownloadGuard {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl DownloadGuard {
    /// Creates a uniquely named directory under `parent`.
    pub async fn create_in(parent: &Path) -> Result<Self, MediaError> {
        tokio::fs::create_dir_all(parent).await?;
        let dir = tempfile::Builder::new()
            .prefix("video_")
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        debug!("Created download dir {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DownloadGuard {
    // Synchronous removal; runs wherever the response body is dropped.
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed download dir {}", self.path.display()),
                Err(e) => warn!(
                    "Failed to remove download dir {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}

/// A finished download. The file lives as long as this value (or its guard).
#[derive(Debug)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub filename: String,
    guard: DownloadGuard,
}

impl DownloadedFile {
    pub fn new(path: PathBuf, guard: DownloadGuard) -> Self {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "video.mp4".to_string());

        Self {
            path,
            filename,
            guard,
        }
    }

    pub fn dir(&self) -> &Path {
        self.guard.path()
    }

    pub fn into_guard(self) -> DownloadGuard {
        self.guard
    }
}
