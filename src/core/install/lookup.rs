// ─── Filename lookup for reference-style entries ───

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::CURSEFORGE_USER_AGENT;

pub const CURSEFORGE_API_BASE: &str = "https://www.curseforge.com/api/v1";

/// Turns a `(project, file)` reference into something downloadable.
#[async_trait]
pub trait FileLookup: Send + Sync {
    /// One network round-trip, no retry.
    async fn resolve_filename(&self, project_id: u64, file_id: u64) -> LauncherResult<String>;

    fn download_url(&self, project_id: u64, file_id: u64) -> String;
}

/// The public CurseForge site API.
#[derive(Debug, Clone)]
pub struct CurseForgeApi {
    client: Client,
    base_url: String,
}

impl CurseForgeApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn file_url(&self, project_id: u64, file_id: u64) -> String {
        format!("{}/mods/{}/files/{}", self.base_url, project_id, file_id)
    }
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    data: FileData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_name: String,
}

#[async_trait]
impl FileLookup for CurseForgeApi {
    async fn resolve_filename(&self, project_id: u64, file_id: u64) -> LauncherResult<String> {
        let lookup_error = |reason: String| LauncherError::NameLookup {
            project_id,
            file_id,
            reason,
        };

        let url = self.file_url(project_id, file_id);
        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, CURSEFORGE_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(lookup_error(format!("HTTP {}", resp.status().as_u16())));
        }

        let body: FileResponse = resp.json().await?;
        let name = body.data.file_name;
        if !is_plain_file_name(&name) {
            return Err(lookup_error(format!("unusable file name {:?}", name)));
        }

        debug!("Resolved {}:{} to {}", project_id, file_id, name);
        Ok(name)
    }

    fn download_url(&self, project_id: u64, file_id: u64) -> String {
        format!("{}/download", self.file_url(project_id, file_id))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(&['/', '\\'][..])
}
