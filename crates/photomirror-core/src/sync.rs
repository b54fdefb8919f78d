//! Mirroring of a [`Library`] into a local directory.
//!
//! Items whose sanitized filename already exists as a regular file in the
//! destination are skipped, so re-running after an abort resumes at item
//! granularity.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::api::MediaApi;
use crate::error::{MirrorError, MirrorResult};
use crate::media::{Library, MediaItem};

/// Per-item progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    /// The local file already exists; nothing was fetched.
    Skipped { filename: String },
    /// A download is about to start.
    Downloading { filename: String },
    /// A download finished and was written to disk.
    Downloaded { filename: String, bytes: usize },
}

/// Outcome of a completed sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items visited, equal to `downloaded + skipped`.
    pub processed: usize,
    /// Items fetched and written.
    pub downloaded: usize,
    /// Items already present locally.
    pub skipped: usize,
}

/// Downloads library items into a destination directory.
#[derive(Debug, Clone)]
pub struct MediaSynchronizer {
    dest_dir: PathBuf,
}

impl MediaSynchronizer {
    /// Creates a synchronizer writing into `dest_dir`.
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }

    /// Returns the destination directory.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Mirrors every item of `library`, in order.
    ///
    /// The first transport or filesystem error aborts the run; files written
    /// before it stay on disk.
    pub async fn sync(
        &self,
        api: &dyn MediaApi,
        library: &Library,
        mut on_progress: impl FnMut(&SyncProgress),
    ) -> MirrorResult<SyncReport> {
        let mut report = SyncReport::default();

        for item in library {
            let filename = item.local_filename();
            let path = self.dest_dir.join(&filename);

            if self.is_present(&path).await? {
                debug!("skipping existing {}", path.display());
                on_progress(&SyncProgress::Skipped { filename });
                report.skipped += 1;
                report.processed += 1;
                continue;
            }

            on_progress(&SyncProgress::Downloading {
                filename: filename.clone(),
            });
            let bytes = self.download_item(api, item, &path).await?;
            on_progress(&SyncProgress::Downloaded { filename, bytes });
            report.downloaded += 1;
            report.processed += 1;
        }

        info!(
            processed = report.processed,
            downloaded = report.downloaded,
            skipped = report.skipped,
            "sync finished"
        );
        Ok(report)
    }

    /// Only a regular file counts; a directory at `path` goes down the
    /// download path and fails there.
    async fn is_present(&self, path: &Path) -> MirrorResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(
                MirrorError::io(format!("failed to check {}: {}", path.display(), e))
                    .with_source(e),
            ),
        }
    }

    async fn download_item(
        &self,
        api: &dyn MediaApi,
        item: &MediaItem,
        path: &Path,
    ) -> MirrorResult<usize> {
        let url = item.download_url();
        debug!(id = %item.id, mime = %item.mime_type, "downloading {}", url);

        let body = api.download(&url).await?;
        write_atomically(path, &body).await?;

        debug!("wrote {} bytes to {}", body.len(), path.display());
        Ok(body.len())
    }
}

/// Writes to a temp sibling first, then renames over `path`.
async fn write_atomically(path: &Path, content: &[u8]) -> MirrorResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".part");
    let temp_path = PathBuf::from(temp_name);

    tokio::fs::write(&temp_path, content).await.map_err(|e| {
        MirrorError::io(format!("failed to write {}: {}", temp_path.display(), e)).with_source(e)
    })?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(
            MirrorError::io(format!("failed to rename to {}: {}", path.display(), e))
                .with_source(e),
        );
    }

    Ok(())
}
