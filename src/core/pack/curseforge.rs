// ─── Project-style manifest (`manifest.json`) ───

use serde::Deserialize;

use super::loader::DeclaredLoader;

pub const MANIFEST_FILE: &str = "manifest.json";
const DEFAULT_OVERRIDES: &str = "overrides";

/// Subset of a CurseForge modpack `manifest.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeManifest {
    pub minecraft: CurseForgeMinecraft,
    #[serde(default)]
    pub files: Vec<CurseForgeFile>,
    /// Directory inside the archive holding the override tree.
    #[serde(default = "default_overrides")]
    pub overrides: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeMinecraft {
    pub version: String,
    #[serde(default)]
    pub mod_loaders: Vec<DeclaredLoader>,
}

/// A file referenced by project and file id; the filename is not known
/// until it is looked up.
#[derive(Debug, Deserialize)]
pub struct CurseForgeFile {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_overrides() -> String {
    DEFAULT_OVERRIDES.to_string()
}

fn default_required() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_manifest() {
        let json = r#"{
            "minecraft": {
                "version": "1.20.1",
                "modLoaders": [{ "id": "forge-47.2.0", "primary": true }]
            },
            "manifestType": "minecraftModpack",
            "name": "Example Pack",
            "files": [
                { "projectID": 238222, "fileID": 4712345, "required": true },
                { "projectID": 32274, "fileID": 4600000, "required": false }
            ]
        }"#;
        let manifest: CurseForgeManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.minecraft.version, "1.20.1");
        assert_eq!(manifest.overrides, "overrides");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].project_id, 238222);
        assert!(!manifest.files[1].required);
    }
}
