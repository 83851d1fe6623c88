use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::context::InstallContext;
use crate::core::catalog::VersionCatalog;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::pack::loader::{fabric_version_id, forge_version_id, quilt_version_id};
use crate::core::pack::{LoaderKind, LoaderSpec};
use crate::core::progress::ProgressSink;

/// Installs a plain game version into `target_dir`.
#[async_trait]
pub trait VersionInstaller: Send + Sync {
    /// Fails when the version is unknown or the network is unavailable.
    async fn install(
        &self,
        version_id: &str,
        target_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> LauncherResult<()>;
}

/// Installs a mod loader on top of a game version.
#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    /// Returns the installed, loader-qualified version id. Callers treat it
    /// as opaque.
    async fn install(&self, ctx: InstallContext<'_>) -> LauncherResult<String>;
}

/// A fully concrete install request: every version is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTarget {
    Vanilla { minecraft: String },
    Forge { minecraft: String, loader: String },
    Fabric { minecraft: String, loader: String },
    Quilt { minecraft: String, loader: String },
}

impl InstallTarget {
    /// Map a resolved loader onto an install request, filling an unspecified
    /// loader version from the catalog.
    pub fn resolve(
        minecraft: &str,
        kind: LoaderKind,
        loader_version: Option<&str>,
        catalog: &VersionCatalog,
    ) -> LauncherResult<Self> {
        let minecraft = minecraft.to_string();
        let target = match kind {
            LoaderKind::None => InstallTarget::Vanilla { minecraft },
            LoaderKind::Forge => {
                let loader = match loader_version {
                    Some(v) => v.to_string(),
                    None => catalog
                        .forge
                        .default_for(&minecraft)
                        .ok_or_else(|| {
                            LauncherError::UnknownVersion(format!("forge for {}", minecraft))
                        })?
                        .to_string(),
                };
                InstallTarget::Forge { minecraft, loader }
            }
            LoaderKind::Fabric => {
                let loader = pick_loader(loader_version, catalog.fabric.latest_loader.as_deref(), "fabric")?;
                InstallTarget::Fabric { minecraft, loader }
            }
            LoaderKind::Quilt => {
                let loader = pick_loader(loader_version, catalog.quilt.latest_loader.as_deref(), "quilt")?;
                InstallTarget::Quilt { minecraft, loader }
            }
            LoaderKind::Unsupported => {
                return Err(LauncherError::UnsupportedLoader("unsupported loader".into()))
            }
        };
        Ok(target)
    }

    pub fn from_spec(minecraft: &str, spec: &LoaderSpec, catalog: &VersionCatalog) -> LauncherResult<Self> {
        if spec.kind() == LoaderKind::Unsupported {
            return Err(LauncherError::UnsupportedLoader(
                spec.declared().unwrap_or("unsupported loader").to_string(),
            ));
        }
        Self::resolve(minecraft, spec.kind(), spec.version(), catalog)
    }

    /// The id this target is expected to install as.
    pub fn expected_version_id(&self) -> String {
        match self {
            InstallTarget::Vanilla { minecraft } => minecraft.clone(),
            InstallTarget::Forge { minecraft, loader } => forge_version_id(minecraft, loader),
            InstallTarget::Fabric { minecraft, loader } => fabric_version_id(minecraft, loader),
            InstallTarget::Quilt { minecraft, loader } => quilt_version_id(minecraft, loader),
        }
    }
}

fn pick_loader(explicit: Option<&str>, latest: Option<&str>, name: &str) -> LauncherResult<String> {
    explicit
        .or(latest)
        .map(str::to_string)
        .ok_or_else(|| LauncherError::Loader(format!("no known {} loader version", name)))
}

/// The installer collaborators, one per loader family.
#[derive(Clone)]
pub struct Installers {
    pub vanilla: Arc<dyn VersionInstaller>,
    pub forge: Arc<dyn LoaderInstaller>,
    pub fabric: Arc<dyn LoaderInstaller>,
    pub quilt: Arc<dyn LoaderInstaller>,
}

impl Installers {
    /// Call exactly one installer for `target` and return the installed id.
    pub async fn install(
        &self,
        target: &InstallTarget,
        target_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> LauncherResult<String> {
        let (installer, minecraft, loader) = match target {
            InstallTarget::Vanilla { minecraft } => {
                info!("Installing Minecraft {}", minecraft);
                self.vanilla.install(minecraft, target_dir, progress).await?;
                return Ok(minecraft.clone());
            }
            InstallTarget::Forge { minecraft, loader } => (&self.forge, minecraft, loader),
            InstallTarget::Fabric { minecraft, loader } => (&self.fabric, minecraft, loader),
            InstallTarget::Quilt { minecraft, loader } => (&self.quilt, minecraft, loader),
        };

        info!("Installing {:?}", target);
        installer
            .install(InstallContext {
                minecraft_version: minecraft,
                loader_version: loader,
                target_dir,
                progress,
            })
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingInstallers;
    use super::*;
    use crate::core::catalog::LoaderVersions;
    use crate::core::progress::NullProgress;

    #[test]
    fn unspecified_fabric_uses_latest_known_loader() {
        let mut catalog = VersionCatalog::default();
        catalog.fabric = LoaderVersions {
            versions: vec!["1.20.1".into()],
            loader_versions: vec!["0.16.0".into(), "0.15.0".into()],
            latest_loader: Some("0.16.0".into()),
        };

        let target = InstallTarget::resolve("1.20.1", LoaderKind::Fabric, None, &catalog).unwrap();
        assert_eq!(
            target,
            InstallTarget::Fabric {
                minecraft: "1.20.1".into(),
                loader: "0.16.0".into()
            }
        );
    }

    #[test]
    fn unspecified_quilt_without_catalog_fails() {
        let err = InstallTarget::resolve("1.20.1", LoaderKind::Quilt, None, &VersionCatalog::default())
            .unwrap_err();
        assert!(matches!(err, LauncherError::Loader(_)));
    }

    #[test]
    fn unsupported_never_resolves() {
        let err = InstallTarget::from_spec(
            "1.20.4",
            &LoaderSpec::unsupported("neoforge"),
            &VersionCatalog::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported loader: neoforge");
    }

    #[tokio::test]
    async fn dispatch_calls_exactly_one_installer() {
        let doubles = RecordingInstallers::new();
        let dir = tempfile::tempdir().unwrap();
        let target = InstallTarget::Fabric {
            minecraft: "1.20.1".into(),
            loader: "0.15.0".into(),
        };

        let id = doubles
            .installers()
            .install(&target, dir.path(), &NullProgress)
            .await
            .unwrap();

        assert_eq!(id, "fabric-loader-0.15.0-1.20.1");
        assert_eq!(id, target.expected_version_id());
        assert_eq!(
            doubles.fabric.calls(),
            vec![("1.20.1".to_string(), Some("0.15.0".to_string()))]
        );
        assert_eq!(doubles.total_calls(), 1);
    }

    #[tokio::test]
    async fn vanilla_id_is_the_plain_version() {
        let doubles = RecordingInstallers::new();
        let dir = tempfile::tempdir().unwrap();

        let id = doubles
            .installers()
            .install(
                &InstallTarget::Vanilla {
                    minecraft: "1.20.1".into(),
                },
                dir.path(),
                &NullProgress,
            )
            .await
            .unwrap();

        assert_eq!(id, "1.20.1");
        assert_eq!(doubles.vanilla.calls(), vec![("1.20.1".to_string(), None)]);
    }
}
