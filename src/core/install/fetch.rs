// ─── Dependency Fetcher ───
// Fetches every required pack file concurrently. A failing entry is recorded
// and never cancels its siblings.

use std::path::{Path, PathBuf};

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use super::lookup::FileLookup;
use crate::core::downloader::Downloader;
use crate::core::error::{FailedEntry, LauncherError, LauncherResult};
use crate::core::pack::descriptor::MODS_DIR;
use crate::core::pack::{FileEntry, FileSource};
use crate::core::progress::{begin_phase, ProgressSink};

/// Aggregate outcome of one `fetch_all` run.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    /// Destinations that already existed and were left alone.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedEntry>,
    pub bytes_downloaded: u64,
}

impl FetchReport {
    /// Turn any recorded failure into `PartialFetchFailure`.
    pub fn into_result(self) -> LauncherResult<FetchSummary> {
        if !self.failed.is_empty() {
            return Err(LauncherError::partial_fetch(self.failed));
        }
        Ok(FetchSummary {
            downloaded: self.downloaded.len(),
            skipped: self.skipped.len(),
            bytes_downloaded: self.bytes_downloaded,
        })
    }
}

/// Counts kept after a fully successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes_downloaded: u64,
}

enum FetchOutcome {
    Downloaded { dest: PathBuf, bytes: u64 },
    Skipped(PathBuf),
}

pub struct DependencyFetcher<'a> {
    downloader: &'a Downloader,
    lookup: &'a dyn FileLookup,
    /// Re-download files that already exist.
    overwrite: bool,
}

impl<'a> DependencyFetcher<'a> {
    pub fn new(downloader: &'a Downloader, lookup: &'a dyn FileLookup) -> Self {
        Self {
            downloader,
            lookup,
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Fetch every required entry into `install_root`.
    ///
    /// All entries run at once; the shared HTTP client's pool is the only
    /// limit. Progress counts finished entries, successful or not.
    pub async fn fetch_all(
        &self,
        files: &[FileEntry],
        install_root: &Path,
        progress: &dyn ProgressSink,
    ) -> FetchReport {
        let required: Vec<&FileEntry> = files.iter().filter(|f| f.required).collect();
        info!(
            "Fetching {} required files ({} optional skipped)",
            required.len(),
            files.len() - required.len()
        );
        begin_phase(progress, "Downloading pack dependencies", required.len() as u64);

        let mut pending: FuturesUnordered<_> = required
            .into_iter()
            .map(|entry| async move { (entry, self.fetch_one(entry, install_root).await) })
            .collect();

        let mut report = FetchReport::default();
        let mut finished = 0u64;

        while let Some((entry, result)) = pending.next().await {
            finished += 1;
            match result {
                Ok(FetchOutcome::Downloaded { dest, bytes }) => {
                    progress.set_status(&format!("Downloaded {}", file_label(&dest)));
                    report.bytes_downloaded += bytes;
                    report.downloaded.push(dest);
                }
                Ok(FetchOutcome::Skipped(dest)) => {
                    debug!("{:?} already present, skipping", dest);
                    report.skipped.push(dest);
                }
                Err(cause) => {
                    warn!("Failed to fetch {}: {}", entry.label(), cause);
                    report.failed.push(FailedEntry {
                        entry: entry.label(),
                        cause,
                    });
                }
            }
            progress.set_progress(finished);
        }

        info!(
            "Fetch finished: {} downloaded ({} bytes), {} skipped, {} failed",
            report.downloaded.len(),
            report.bytes_downloaded,
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    async fn fetch_one(&self, entry: &FileEntry, install_root: &Path) -> LauncherResult<FetchOutcome> {
        match &entry.source {
            FileSource::Direct { path, downloads } => {
                let dest = install_root.join(path);
                if self.already_present(&dest) {
                    return Ok(FetchOutcome::Skipped(dest));
                }
                if downloads.is_empty() {
                    return Err(LauncherError::NoDownloadSource(path.clone()));
                }
                let bytes = self
                    .downloader
                    .download_first(downloads, &dest, &entry.validation)
                    .await?;
                Ok(FetchOutcome::Downloaded { dest, bytes })
            }
            FileSource::Reference {
                project_id,
                file_id,
            } => {
                let name = self.lookup.resolve_filename(*project_id, *file_id).await?;
                let dest = install_root.join(MODS_DIR).join(name);
                if self.already_present(&dest) {
                    return Ok(FetchOutcome::Skipped(dest));
                }
                let url = self.lookup.download_url(*project_id, *file_id);
                let bytes = self
                    .downloader
                    .download_file(&url, &dest, &entry.validation)
                    .await?;
                Ok(FetchOutcome::Downloaded { dest, bytes })
            }
        }
    }

    fn already_present(&self, dest: &Path) -> bool {
        !self.overwrite && dest.is_file()
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
