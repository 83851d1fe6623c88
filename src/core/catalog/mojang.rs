// ─── Version Manifest ───
// Fetches the Mojang version manifest v2 and reduces it to the plain
// version list the catalog keeps.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
}

/// Cached as `versions.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainVersions {
    pub versions: Vec<String>,
    /// Newest snapshot.
    pub latest: String,
}

impl PlainVersions {
    pub fn contains(&self, id: &str) -> bool {
        self.versions.iter().any(|v| v == id)
    }
}

impl VersionManifest {
    pub async fn fetch(client: &reqwest::Client, url: &str) -> LauncherResult<Self> {
        info!("Fetching Minecraft version manifest...");

        let resp = client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let manifest: VersionManifest = resp.json().await?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    pub fn into_plain(self) -> PlainVersions {
        PlainVersions {
            versions: self.versions.into_iter().map(|v| v.id).collect(),
            latest: self.latest.snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_ids_and_latest_snapshot() {
        let json = r#"{
            "latest": { "release": "1.20.4", "snapshot": "24w03a" },
            "versions": [
                { "id": "24w03a", "type": "snapshot", "url": "https://example.com/a.json" },
                { "id": "1.20.4", "type": "release", "url": "https://example.com/b.json" }
            ]
        }"#;
        let manifest: VersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.versions[1].version_type, "release");

        let plain = manifest.into_plain();
        assert_eq!(plain.latest, "24w03a");
        assert!(plain.contains("1.20.4"));
    }
}
