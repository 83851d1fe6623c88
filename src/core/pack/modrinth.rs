// ─── Pack-index manifest (`modrinth.index.json`) ───

use std::collections::HashMap;

use serde::Deserialize;

pub const INDEX_FILE: &str = "modrinth.index.json";
pub const OVERRIDES_DIR: &str = "overrides";
pub const CLIENT_OVERRIDES_DIR: &str = "client-overrides";

/// Subset of a Modrinth `modrinth.index.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModrinthIndex {
    #[serde(default)]
    pub format_version: Option<u32>,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version_id: Option<String>,
    pub files: Vec<ModrinthFile>,
    /// `minecraft` plus at most one loader key, e.g. `fabric-loader`.
    pub dependencies: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModrinthFile {
    pub path: String,
    #[serde(default)]
    pub hashes: ModrinthHashes,
    #[serde(default)]
    pub env: Option<ModrinthEnv>,
    #[serde(default)]
    pub downloads: Vec<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModrinthHashes {
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModrinthEnv {
    pub client: EnvSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvSupport {
    Required,
    Optional,
    Unsupported,
}

impl ModrinthFile {
    /// Client-unsupported files are not part of a client install.
    pub fn needed_on_client(&self) -> bool {
        self.env
            .as_ref()
            .map(|env| env.client != EnvSupport::Unsupported)
            .unwrap_or(true)
    }
}
