use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use super::model::{Profile, ProfileRecord, GAME_DIR, PROFILE_FILE};
use crate::core::error::{LauncherError, LauncherResult};

/// Owns the on-disk profile tree. Names are case-insensitive: each profile
/// directory is named after the lowercased profile name.
///
/// Not safe for concurrent writers to the same name.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    /// Root directory where all profiles live.
    profiles_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(profiles_dir: PathBuf) -> Self {
        Self { profiles_dir }
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    /// Directory a profile with `name` lives (or would live) in.
    pub fn profile_dir(&self, name: &str) -> LauncherResult<PathBuf> {
        Ok(self.profiles_dir.join(canonical_name(name)?))
    }

    /// Game directory for `name`; created by `create`.
    pub fn game_dir(&self, name: &str) -> LauncherResult<PathBuf> {
        Ok(self.profile_dir(name)?.join(GAME_DIR))
    }

    /// Whether a profile directory for `name` exists, record or not.
    pub fn exists(&self, name: &str) -> LauncherResult<bool> {
        Ok(self.profile_dir(name)?.exists())
    }

    /// Create (or with `overwrite`, replace the record of) a profile.
    ///
    /// An existing directory is reused as is: its contents are merged, not
    /// wiped. Delete first for a clean slate.
    pub async fn create(&self, name: &str, version_id: &str, overwrite: bool) -> LauncherResult<Profile> {
        let dir = self.profile_dir(name)?;
        if dir.exists() && !overwrite {
            return Err(LauncherError::ProfileAlreadyExists(name.to_string()));
        }

        let game_dir = dir.join(GAME_DIR);
        tokio::fs::create_dir_all(&game_dir)
            .await
            .map_err(|e| LauncherError::io(&game_dir, e))?;

        let record = ProfileRecord {
            profile_name: name.to_string(),
            profile_version: version_id.to_string(),
            created_at: Some(Utc::now()),
        };
        let record_path = dir.join(PROFILE_FILE);
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(&record_path, json)
            .await
            .map_err(|e| LauncherError::io(&record_path, e))?;

        info!("Created profile '{}' ({})", name, version_id);
        Ok(Profile::from_record(record, dir))
    }

    /// Load a single profile by name.
    pub async fn get(&self, name: &str) -> LauncherResult<Profile> {
        let dir = self.profile_dir(name)?;
        let record_path = dir.join(PROFILE_FILE);
        if !record_path.is_file() {
            return Err(LauncherError::ProfileNotFound(name.to_string()));
        }

        let json = tokio::fs::read_to_string(&record_path)
            .await
            .map_err(|e| LauncherError::io(&record_path, e))?;
        let record: ProfileRecord = serde_json::from_str(&json)?;
        Ok(Profile::from_record(record, dir))
    }

    /// Names of every profile with a readable record, sorted.
    pub async fn list(&self) -> LauncherResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.profiles_dir.exists() {
            return Ok(names);
        }

        let mut entries = tokio::fs::read_dir(&self.profiles_dir)
            .await
            .map_err(|e| LauncherError::io(&self.profiles_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&self.profiles_dir, e))?
        {
            let record_path = entry.path().join(PROFILE_FILE);
            if !record_path.is_file() {
                continue;
            }
            match tokio::fs::read_to_string(&record_path).await {
                Ok(json) => match serde_json::from_str::<ProfileRecord>(&json) {
                    Ok(record) => names.push(record.profile_name),
                    Err(e) => warn!("Corrupt profile.json at {:?}: {}", record_path, e),
                },
                Err(e) => warn!("Cannot read {:?}: {}", record_path, e),
            }
        }

        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }

    /// Delete a profile and its whole game directory.
    pub async fn delete(&self, name: &str) -> LauncherResult<()> {
        let dir = self.profile_dir(name)?;
        if !dir.exists() {
            return Err(LauncherError::ProfileNotFound(name.to_string()));
        }

        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| LauncherError::io(&dir, e))?;

        info!("Deleted profile '{}'", name);
        Ok(())
    }
}

/// Lowercased directory name for `name`, rejecting anything path-like.
fn canonical_name(name: &str) -> LauncherResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(&['/', '\\', ':'][..])
    {
        return Err(LauncherError::InvalidProfileName(name.to_string()));
    }
    Ok(trimmed.to_lowercase())
}
