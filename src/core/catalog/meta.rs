// Fabric Meta and Quilt Meta expose the same shape, so one reader serves both.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

pub const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";
pub const QUILT_META_BASE: &str = "https://meta.quiltmc.org/v3";

/// Cached as `fabric_versions.json` / `quilt_versions.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderVersions {
    /// Supported Minecraft versions, stable ones first.
    pub versions: Vec<String>,
    pub loader_versions: Vec<String>,
    pub latest_loader: Option<String>,
}

impl LoaderVersions {
    pub fn supports(&self, minecraft: &str) -> bool {
        self.versions.iter().any(|v| v == minecraft)
    }
}

#[derive(Debug, Deserialize)]
struct MetaGameVersion {
    version: String,
    #[serde(default)]
    stable: bool,
}

#[derive(Debug, Deserialize)]
struct MetaLoaderVersion {
    version: String,
    /// Quilt omits this; pre-releases carry a `-` suffix instead.
    #[serde(default)]
    stable: Option<bool>,
}

impl MetaLoaderVersion {
    fn is_stable(&self) -> bool {
        self.stable.unwrap_or_else(|| !self.version.contains('-'))
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    name: &str,
) -> LauncherResult<T> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(LauncherError::LoaderApi(format!(
            "{} Meta returned {} for {}",
            name,
            resp.status(),
            url
        )));
    }
    Ok(resp.json().await?)
}

/// Read game and loader versions from a Fabric-style meta API at `base`.
pub async fn fetch_loader_versions(
    client: &reqwest::Client,
    base: &str,
    name: &str,
) -> LauncherResult<LoaderVersions> {
    let base = base.trim_end_matches('/');
    let game_url = format!("{}/versions/game", base);
    let loader_url = format!("{}/versions/loader", base);
    let (games, loaders) = tokio::try_join!(
        get_json::<Vec<MetaGameVersion>>(client, &game_url, name),
        get_json::<Vec<MetaLoaderVersion>>(client, &loader_url, name),
    )?;

    let versions = from_meta(games, loaders);
    info!(
        "Loaded {} {} game versions, latest loader {:?}",
        versions.versions.len(),
        name,
        versions.latest_loader
    );
    Ok(versions)
}

fn from_meta(games: Vec<MetaGameVersion>, loaders: Vec<MetaLoaderVersion>) -> LoaderVersions {
    let (stable, unstable): (Vec<_>, Vec<_>) = games.into_iter().partition(|g| g.stable);
    let versions = stable
        .into_iter()
        .chain(unstable)
        .map(|g| g.version)
        .collect();

    let latest_loader = loaders
        .iter()
        .find(|l| l.is_stable())
        .or_else(|| loaders.first())
        .map(|l| l.version.clone());

    LoaderVersions {
        versions,
        loader_versions: loaders.into_iter().map(|l| l.version).collect(),
        latest_loader,
    }
}
