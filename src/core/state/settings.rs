use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::catalog::CatalogEndpoints;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::install::lookup::CURSEFORGE_API_BASE;

const APP_DIR_NAME: &str = "PackLauncher";
const BOOTSTRAP_FILE: &str = "launcher_bootstrap.json";
pub const SETTINGS_FILE: &str = "launcher_settings.json";

/// Persisted as `launcher_settings.json` inside `data_dir`. Missing keys
/// fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Root for settings, profiles and the version catalog cache.
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/profiles`.
    pub profiles_dir: Option<PathBuf>,
    /// Parent of pack working directories.
    pub work_root: PathBuf,
    /// Re-download pack files that already exist.
    pub overwrite_downloads: bool,
    pub curseforge_api: String,
    pub catalog: CatalogEndpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BootstrapConfig {
    data_dir: PathBuf,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profiles_dir: None,
            work_root: std::env::temp_dir().join(APP_DIR_NAME),
            overwrite_downloads: false,
            curseforge_api: CURSEFORGE_API_BASE.to_string(),
            catalog: CatalogEndpoints::default(),
        }
    }
}

impl LauncherSettings {
    /// Settings rooted at `data_dir`, everything else default.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            work_root: data_dir.join("work"),
            data_dir,
            ..Self::default()
        }
    }

    /// Read the settings file in `data_dir`. A missing or unreadable file
    /// yields defaults rooted at `data_dir`.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No settings at {:?}, using defaults", path);
                return Self::in_dir(data_dir);
            }
        };

        match serde_json::from_str::<Self>(&raw) {
            Ok(mut settings) => {
                settings.data_dir = data_dir.to_path_buf();
                settings
            }
            Err(e) => {
                warn!("Ignoring corrupt {:?}: {}", path, e);
                Self::in_dir(data_dir)
            }
        }
    }

    /// Load from the default data directory.
    pub fn load_default() -> Self {
        Self::load(&default_data_dir())
    }

    pub fn save(&self) -> LauncherResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| LauncherError::io(&self.data_dir, e))?;
        let path = self.data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| LauncherError::io(&path, e))
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.profiles_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("profiles"))
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `<platform data dir>/PackLauncher`, unless a bootstrap file points
/// somewhere else.
fn default_data_dir() -> PathBuf {
    let bootstrap_path = default_base_dir().join(BOOTSTRAP_FILE);

    if let Ok(raw) = std::fs::read_to_string(&bootstrap_path) {
        if let Ok(cfg) = serde_json::from_str::<BootstrapConfig>(&raw) {
            return cfg.data_dir;
        }
    }

    default_base_dir().join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_custom_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = LauncherSettings::in_dir(dir.path());
        settings.overwrite_downloads = true;
        settings.profiles_dir = Some(dir.path().join("elsewhere"));
        settings.save().unwrap();

        let loaded = LauncherSettings::load(dir.path());
        assert_eq!(loaded, settings);
        assert_eq!(loaded.profiles_dir(), dir.path().join("elsewhere"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "overwrite_downloads": true }"#).unwrap();

        let loaded = LauncherSettings::load(dir.path());
        assert!(loaded.overwrite_downloads);
        assert_eq!(loaded.data_dir, dir.path());
        assert_eq!(loaded.profiles_dir(), dir.path().join("profiles"));
        assert_eq!(loaded.curseforge_api, CURSEFORGE_API_BASE);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();

        let loaded = LauncherSettings::load(dir.path());
        assert_eq!(loaded, LauncherSettings::in_dir(dir.path()));
    }
}
