use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

pub const FORGE_PROMOTIONS_URL: &str =
    "https://files.minecraftforge.net/net/minecraftforge/forge/promotions_slim.json";

#[derive(Debug, Deserialize)]
struct Promotions {
    promos: BTreeMap<String, String>,
}

/// Cached as `forge_versions.json`. Keyed by Minecraft version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeVersions {
    /// Recommended build where there is one, latest otherwise.
    pub versions: BTreeMap<String, String>,
    pub latest: BTreeMap<String, String>,
    pub recommended: BTreeMap<String, String>,
}

impl ForgeVersions {
    pub fn default_for(&self, minecraft: &str) -> Option<&str> {
        self.versions.get(minecraft).map(String::as_str)
    }

    fn from_promos(promos: BTreeMap<String, String>) -> Self {
        let mut latest = BTreeMap::new();
        let mut recommended = BTreeMap::new();

        for (name, build) in promos {
            if let Some(mc) = name.strip_suffix("-recommended") {
                recommended.insert(mc.to_string(), build);
            } else if let Some(mc) = name.strip_suffix("-latest") {
                latest.insert(mc.to_string(), build);
            }
        }

        let mut versions = latest.clone();
        versions.extend(recommended.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            versions,
            latest,
            recommended,
        }
    }

    pub async fn fetch(client: &reqwest::Client, url: &str) -> LauncherResult<Self> {
        let resp = client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(LauncherError::LoaderApi(format!(
                "Forge promotions returned {}",
                resp.status()
            )));
        }
        let promotions: Promotions = resp.json().await?;
        let versions = Self::from_promos(promotions.promos);

        info!("Loaded Forge builds for {} versions", versions.versions.len());
        Ok(versions)
    }
}
