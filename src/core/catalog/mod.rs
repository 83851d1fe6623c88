// ─── Version Catalog ───
// Known plain versions and loader versions. Refreshed from the network when
// possible and cached as JSON files; the cache is read verbatim when offline.

pub mod forge;
pub mod meta;
pub mod mojang;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

pub use forge::ForgeVersions;
pub use meta::LoaderVersions;
pub use mojang::PlainVersions;

const VERSIONS_FILE: &str = "versions.json";
const FORGE_VERSIONS_FILE: &str = "forge_versions.json";
const FABRIC_VERSIONS_FILE: &str = "fabric_versions.json";
const QUILT_VERSIONS_FILE: &str = "quilt_versions.json";

/// Where the catalog is refreshed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoints {
    pub version_manifest: String,
    pub forge_promotions: String,
    pub fabric_meta: String,
    pub quilt_meta: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            version_manifest: mojang::VERSION_MANIFEST_URL.to_string(),
            forge_promotions: forge::FORGE_PROMOTIONS_URL.to_string(),
            fabric_meta: meta::FABRIC_META_BASE.to_string(),
            quilt_meta: meta::QUILT_META_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    pub plain: PlainVersions,
    pub forge: ForgeVersions,
    pub fabric: LoaderVersions,
    pub quilt: LoaderVersions,
    /// True when the catalog came from the cache because a refresh failed.
    pub offline: bool,
}

impl VersionCatalog {
    /// Refresh from `endpoints` and rewrite the cache in `cache_dir`; fall
    /// back to the cache when the refresh fails.
    pub async fn load(
        client: &reqwest::Client,
        endpoints: &CatalogEndpoints,
        cache_dir: &Path,
    ) -> LauncherResult<Self> {
        match Self::refresh(client, endpoints).await {
            Ok(catalog) => {
                catalog.save(cache_dir).await?;
                Ok(catalog)
            }
            Err(e) => {
                warn!("Version catalog refresh failed ({}), using offline cache", e);
                let mut catalog = Self::read_cache(cache_dir).await?;
                catalog.offline = true;
                Ok(catalog)
            }
        }
    }

    pub async fn refresh(client: &reqwest::Client, endpoints: &CatalogEndpoints) -> LauncherResult<Self> {
        let (manifest, forge, fabric, quilt) = tokio::try_join!(
            mojang::VersionManifest::fetch(client, &endpoints.version_manifest),
            ForgeVersions::fetch(client, &endpoints.forge_promotions),
            meta::fetch_loader_versions(client, &endpoints.fabric_meta, "Fabric"),
            meta::fetch_loader_versions(client, &endpoints.quilt_meta, "Quilt"),
        )?;

        Ok(Self {
            plain: manifest.into_plain(),
            forge,
            fabric,
            quilt,
            offline: false,
        })
    }

    pub async fn save(&self, cache_dir: &Path) -> LauncherResult<()> {
        tokio::fs::create_dir_all(cache_dir)
            .await
            .map_err(|e| LauncherError::io(cache_dir, e))?;

        write_json(&cache_dir.join(VERSIONS_FILE), &self.plain).await?;
        write_json(&cache_dir.join(FORGE_VERSIONS_FILE), &self.forge).await?;
        write_json(&cache_dir.join(FABRIC_VERSIONS_FILE), &self.fabric).await?;
        write_json(&cache_dir.join(QUILT_VERSIONS_FILE), &self.quilt).await?;

        info!("Version catalog cached in {:?}", cache_dir);
        Ok(())
    }

    pub async fn read_cache(cache_dir: &Path) -> LauncherResult<Self> {
        Ok(Self {
            plain: read_json(&cache_dir.join(VERSIONS_FILE)).await?,
            forge: read_json(&cache_dir.join(FORGE_VERSIONS_FILE)).await?,
            fabric: read_json(&cache_dir.join(FABRIC_VERSIONS_FILE)).await?,
            quilt: read_json(&cache_dir.join(QUILT_VERSIONS_FILE)).await?,
            offline: false,
        })
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| LauncherError::io(path, e))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> LauncherResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}
