use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROFILE_FILE: &str = "profile.json";
pub const GAME_DIR: &str = "game";

/// Metadata persisted as `profile.json` in each profile directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub profile_name: String,
    pub profile_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A named installation: one version id bound to its own game directory.
///
/// Each profile lives in `profiles/<lowercased name>/` with:
/// - `game/`         — game working directory, owned by the profile
/// - `profile.json`  — the serialized `ProfileRecord`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub version_id: String,
    pub path: PathBuf,
}

impl Profile {
    pub(crate) fn from_record(record: ProfileRecord, path: PathBuf) -> Self {
        Self {
            name: record.profile_name,
            version_id: record.profile_version,
            path,
        }
    }

    /// Path to the profile's game directory.
    pub fn game_dir(&self) -> PathBuf {
        self.path.join(GAME_DIR)
    }

    pub fn record_path(&self) -> PathBuf {
        self.path.join(PROFILE_FILE)
    }
}
