use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::settings::LauncherSettings;
use crate::core::catalog::VersionCatalog;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::install::{CurseForgeApi, FileLookup, InstallFailure, InstallStage, PackInstaller};
use crate::core::loaders::{InstallTarget, Installers};
use crate::core::pack::{LoaderKind, VersionSpec};
use crate::core::profile::{Profile, ProfileStore};
use crate::core::progress::ProgressSink;

/// Entry point tying profiles, pack installs and the version catalog
/// together. A profile's game directory is also its installer target.
pub struct Launcher {
    settings: LauncherSettings,
    profiles: ProfileStore,
    downloader: Downloader,
    lookup: Arc<dyn FileLookup>,
    installers: Installers,
    catalog: VersionCatalog,
}

impl Launcher {
    pub fn new(settings: LauncherSettings, installers: Installers) -> LauncherResult<Self> {
        let client = build_http_client()?;
        let lookup = Arc::new(CurseForgeApi::new(client.clone(), settings.curseforge_api.clone()));

        Ok(Self {
            profiles: ProfileStore::new(settings.profiles_dir()),
            downloader: Downloader::new(client),
            lookup,
            installers,
            catalog: VersionCatalog::default(),
            settings,
        })
    }

    /// Replace the pack file lookup, e.g. with a mirror.
    pub fn with_lookup(mut self, lookup: Arc<dyn FileLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: VersionCatalog) {
        self.catalog = catalog;
    }

    /// Refresh the version catalog, falling back to the on-disk cache.
    pub async fn load_catalog(&mut self) -> LauncherResult<&VersionCatalog> {
        self.catalog = VersionCatalog::load(
            self.downloader.client(),
            &self.settings.catalog,
            &self.settings.data_dir,
        )
        .await?;
        Ok(&self.catalog)
    }

    fn pack_installer(&self) -> PackInstaller<'_> {
        PackInstaller {
            downloader: &self.downloader,
            lookup: self.lookup.as_ref(),
            installers: &self.installers,
            catalog: &self.catalog,
            work_root: &self.settings.work_root,
            overwrite_downloads: self.settings.overwrite_downloads,
        }
    }

    /// Install a pack archive into the profile `name` and record it.
    ///
    /// With `overwrite`, an existing profile's game directory is merged
    /// into. A profile directory created by this call is removed again if
    /// the install fails.
    pub async fn install_pack(
        &self,
        archive: &Path,
        name: &str,
        overwrite: bool,
        progress: &dyn ProgressSink,
    ) -> Result<Profile, InstallFailure> {
        let profile_dir = self
            .profiles
            .profile_dir(name)
            .map_err(InstallFailure::before_start)?;
        let existed = profile_dir.exists();
        if existed && !overwrite {
            return Err(InstallFailure::before_start(
                LauncherError::ProfileAlreadyExists(name.to_string()),
            ));
        }
        let game_dir = self
            .profiles
            .game_dir(name)
            .map_err(InstallFailure::before_start)?;

        info!("Installing pack {:?} into profile '{}'", archive, name);
        if let Err(e) = tokio::fs::create_dir_all(&game_dir).await {
            return Err(InstallFailure::before_start(LauncherError::io(&game_dir, e)));
        }
        let outcome = match self.pack_installer().install(archive, &game_dir, progress).await {
            Ok(result) => self
                .profiles
                .create(name, &result.version_id, true)
                .await
                .map_err(|error| InstallFailure {
                    stage: InstallStage::Done,
                    error,
                    working_dir: None,
                }),
            Err(failure) => Err(failure),
        };

        if outcome.is_err() && !existed {
            rollback(&profile_dir).await;
        }
        outcome
    }

    /// Install the version named by `version_spec` and bind it to a new
    /// profile. Accepts `1.20.1`, `fabric*1.20.1` or `1.20.1-forge-47.2.0`.
    pub async fn create_profile(
        &self,
        name: &str,
        version_spec: &str,
        overwrite: bool,
        progress: &dyn ProgressSink,
    ) -> LauncherResult<Profile> {
        if self.profiles.exists(name)? && !overwrite {
            return Err(LauncherError::ProfileAlreadyExists(name.to_string()));
        }

        let spec = VersionSpec::parse(version_spec)?;
        if spec.loader == LoaderKind::None
            && !self.catalog.plain.versions.is_empty()
            && !self.catalog.plain.contains(&spec.minecraft_version)
        {
            return Err(LauncherError::UnknownVersion(spec.minecraft_version));
        }

        let target = InstallTarget::resolve(
            &spec.minecraft_version,
            spec.loader,
            spec.loader_version.as_deref(),
            &self.catalog,
        )?;

        let profile_dir = self.profiles.profile_dir(name)?;
        let existed = profile_dir.exists();
        let game_dir = self.profiles.game_dir(name)?;
        tokio::fs::create_dir_all(&game_dir)
            .await
            .map_err(|e| LauncherError::io(&game_dir, e))?;

        let outcome = match self.installers.install(&target, &game_dir, progress).await {
            Ok(version_id) => self.profiles.create(name, &version_id, true).await,
            Err(e) => Err(e),
        };
        if outcome.is_err() && !existed {
            rollback(&profile_dir).await;
        }
        outcome
    }

    pub async fn get_profile(&self, name: &str) -> LauncherResult<Profile> {
        self.profiles.get(name).await
    }

    pub async fn list_profiles(&self) -> LauncherResult<Vec<String>> {
        self.profiles.list().await
    }

    pub async fn delete_profile(&self, name: &str) -> LauncherResult<()> {
        self.profiles.delete(name).await
    }
}

async fn rollback(profile_dir: &Path) {
    if !profile_dir.exists() {
        return;
    }
    match tokio::fs::remove_dir_all(profile_dir).await {
        Ok(()) => info!("Rolled back partial profile {:?}", profile_dir),
        Err(e) => warn!("Could not roll back {:?}: {}", profile_dir, e),
    }
}
