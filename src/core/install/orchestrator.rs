// ─── Installation Orchestrator ───
// Start → Extracted → Parsed → OverridesMerged → DependenciesFetched →
// LoaderResolved → VersionInstalled → Done, or an `InstallFailure` carrying
// the last stage reached.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::fetch::{DependencyFetcher, FetchSummary};
use super::lookup::FileLookup;
use super::overrides::merge_overrides;
use crate::core::catalog::VersionCatalog;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::{InstallTarget, Installers};
use crate::core::pack::{self, archive, LoaderKind};
use crate::core::progress::{begin_phase, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Start,
    Extracted,
    Parsed,
    OverridesMerged,
    DependenciesFetched,
    LoaderResolved,
    VersionInstalled,
    Done,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::Start => "start",
            InstallStage::Extracted => "extraction",
            InstallStage::Parsed => "manifest parsing",
            InstallStage::OverridesMerged => "override merge",
            InstallStage::DependenciesFetched => "dependency fetch",
            InstallStage::LoaderResolved => "loader resolution",
            InstallStage::VersionInstalled => "version install",
            InstallStage::Done => "cleanup",
        };
        write!(f, "{}", name)
    }
}

/// Terminal failure of one install run.
#[derive(Debug, Error)]
#[error("install aborted after {stage}: {error}")]
pub struct InstallFailure {
    /// Last stage that completed.
    pub stage: InstallStage,
    #[source]
    pub error: LauncherError,
    /// Left in place for diagnostics; never reused as a source of truth.
    pub working_dir: Option<PathBuf>,
}

impl InstallFailure {
    pub fn before_start(error: LauncherError) -> Self {
        Self {
            stage: InstallStage::Start,
            error,
            working_dir: None,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationResult {
    /// Installer-addressable version id.
    pub version_id: String,
    pub minecraft_version: String,
    pub loader: LoaderKind,
    pub overrides_copied: usize,
    pub fetch: FetchSummary,
}

/// Sequences one pack install into a game directory it is handed. The same
/// directory is the installers' target.
///
/// It never touches profile metadata.
pub struct PackInstaller<'a> {
    pub downloader: &'a Downloader,
    pub lookup: &'a dyn FileLookup,
    pub installers: &'a Installers,
    pub catalog: &'a VersionCatalog,
    /// Parent of every working directory.
    pub work_root: &'a Path,
    pub overwrite_downloads: bool,
}

impl PackInstaller<'_> {
    pub async fn install(
        &self,
        archive_path: &Path,
        game_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<InstallationResult, InstallFailure> {
        let mut stage = InstallStage::Start;
        let working_dir = archive::working_dir_for(self.work_root, archive_path);

        let outcome = self
            .run(archive_path, game_dir, &working_dir, progress, &mut stage)
            .await;
        match outcome {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!("Install of {:?} aborted after {}: {}", archive_path, stage, error);
                progress.set_status(&format!("Install failed: {}", error));
                Err(InstallFailure {
                    stage,
                    error,
                    working_dir: working_dir.exists().then_some(working_dir),
                })
            }
        }
    }

    async fn run(
        &self,
        archive_path: &Path,
        game_dir: &Path,
        working_dir: &Path,
        progress: &dyn ProgressSink,
        stage: &mut InstallStage,
    ) -> LauncherResult<InstallationResult> {
        // ── Extract ─────────────────────────────────────
        begin_phase(progress, "Unzipping pack", 1);
        let archive_owned = archive_path.to_path_buf();
        let work_root = self.work_root.to_path_buf();
        tokio::task::spawn_blocking(move || archive::extract(&archive_owned, &work_root))
            .await
            .map_err(|e| LauncherError::Other(format!("extraction task failed: {}", e)))??;
        progress.set_progress(1);
        *stage = InstallStage::Extracted;

        // ── Parse ───────────────────────────────────────
        let descriptor = pack::parse(working_dir)?;
        *stage = InstallStage::Parsed;
        if descriptor.loader_kind() == LoaderKind::Unsupported {
            return Err(LauncherError::UnsupportedLoader(
                descriptor.loader.declared().unwrap_or("unknown").to_string(),
            ));
        }

        // ── Overrides ───────────────────────────────────
        let mut overrides_copied = merge_overrides(&descriptor.overrides_root, game_dir, progress)?;
        if let Some(client_root) = &descriptor.client_overrides_root {
            overrides_copied += merge_overrides(client_root, game_dir, progress)?;
        }
        *stage = InstallStage::OverridesMerged;

        // ── Dependencies ────────────────────────────────
        let fetch = DependencyFetcher::new(self.downloader, self.lookup)
            .with_overwrite(self.overwrite_downloads)
            .fetch_all(&descriptor.required_files, game_dir, progress)
            .await
            .into_result()?;
        *stage = InstallStage::DependenciesFetched;

        // ── Loader ──────────────────────────────────────
        let target =
            InstallTarget::from_spec(&descriptor.minecraft_version, &descriptor.loader, self.catalog)?;
        *stage = InstallStage::LoaderResolved;

        // ── Version ─────────────────────────────────────
        progress.set_status(&format!("Installing {}", target.expected_version_id()));
        let version_id = self
            .installers
            .install(&target, game_dir, progress)
            .await?;
        *stage = InstallStage::VersionInstalled;

        // ── Cleanup ─────────────────────────────────────
        if let Err(e) = tokio::fs::remove_dir_all(working_dir).await {
            warn!("Could not remove working directory {:?}: {}", working_dir, e);
        }
        *stage = InstallStage::Done;

        info!(
            "Installed pack {:?} as {} ({} overrides, {} downloaded, {} skipped)",
            descriptor.name.as_deref().unwrap_or("<unnamed>"),
            version_id,
            overrides_copied,
            fetch.downloaded,
            fetch.skipped
        );
        progress.set_status("Pack installed");

        Ok(InstallationResult {
            version_id,
            minecraft_version: descriptor.minecraft_version,
            loader: descriptor.loader.kind(),
            overrides_copied,
            fetch,
        })
    }
}
