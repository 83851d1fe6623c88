// ─── Pack Descriptor Parser ───
// Reads whichever manifest the working directory holds and normalizes it into
// a format-agnostic `PackDescriptor`. Nothing downstream looks at the source
// format again.

use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::curseforge::{self, CurseForgeManifest};
use super::loader::{self, LoaderKind, LoaderSpec};
use super::modrinth::{self, ModrinthIndex};
use crate::core::downloader::FileValidation;
use crate::core::error::{LauncherError, LauncherResult};

/// Directory that reference-style entries are placed in.
pub const MODS_DIR: &str = "mods";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFormat {
    CurseForge,
    Modrinth,
}

/// Where a file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Known destination and candidate URLs, tried in order.
    Direct { path: String, downloads: Vec<String> },
    /// A `(project, file)` pair; the filename has to be looked up before the
    /// file lands in `mods/`.
    Reference { project_id: u64, file_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub source: FileSource,
    pub validation: FileValidation,
    /// Non-required entries are never fetched.
    pub required: bool,
}

impl FileEntry {
    /// Destination relative to the installation root, when already known.
    pub fn relative_path(&self) -> Option<&str> {
        match &self.source {
            FileSource::Direct { path, .. } => Some(path),
            FileSource::Reference { .. } => None,
        }
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.validation.size
    }

    /// Human readable label for logs and failure reports.
    pub fn label(&self) -> String {
        match &self.source {
            FileSource::Direct { path, .. } => path.clone(),
            FileSource::Reference {
                project_id,
                file_id,
            } => format!("{}:{}", project_id, file_id),
        }
    }
}

/// Normalized pack description.
#[derive(Debug, Clone)]
pub struct PackDescriptor {
    pub format: PackFormat,
    pub name: Option<String>,
    pub minecraft_version: String,
    pub loader: LoaderSpec,
    pub required_files: Vec<FileEntry>,
    /// May not exist; overrides are optional.
    pub overrides_root: PathBuf,
    /// Client-only overrides, merged after `overrides_root`.
    pub client_overrides_root: Option<PathBuf>,
}

impl PackDescriptor {
    pub fn loader_kind(&self) -> LoaderKind {
        self.loader.kind()
    }

    pub fn loader_version(&self) -> Option<&str> {
        self.loader.version()
    }
}

/// The two manifest schemas, resolved once at parse time.
#[derive(Debug)]
enum PackManifest {
    CurseForge(CurseForgeManifest),
    Modrinth(ModrinthIndex),
}

/// Parse the manifest found in `working_dir`. Does not modify the directory.
pub fn parse(working_dir: &Path) -> LauncherResult<PackDescriptor> {
    let index_path = working_dir.join(modrinth::INDEX_FILE);
    let manifest_path = working_dir.join(curseforge::MANIFEST_FILE);

    let (manifest, source) = if index_path.is_file() {
        (PackManifest::Modrinth(read_json(&index_path)?), index_path)
    } else if manifest_path.is_file() {
        (PackManifest::CurseForge(read_json(&manifest_path)?), manifest_path)
    } else {
        return Err(LauncherError::ManifestMissing(working_dir.to_path_buf()));
    };

    let descriptor = match manifest {
        PackManifest::CurseForge(m) => from_curseforge(m, working_dir, &source)?,
        PackManifest::Modrinth(m) => from_modrinth(m, working_dir, &source)?,
    };

    info!(
        "Parsed {:?} pack for Minecraft {} (loader {} {}), {} files",
        descriptor.format,
        descriptor.minecraft_version,
        descriptor.loader_kind(),
        descriptor.loader_version().unwrap_or("-"),
        descriptor.required_files.len()
    );
    Ok(descriptor)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> LauncherResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| malformed(path, e.to_string()))
}

fn malformed(path: &Path, reason: impl Into<String>) -> LauncherError {
    LauncherError::ManifestMalformed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn from_curseforge(
    manifest: CurseForgeManifest,
    working_dir: &Path,
    source: &Path,
) -> LauncherResult<PackDescriptor> {
    let loader = loader::resolve_primary(&manifest.minecraft.mod_loaders)
        .map_err(|e| malformed(source, e.to_string()))?;

    let overrides = safe_relative_path(&manifest.overrides)
        .ok_or_else(|| malformed(source, format!("unsafe overrides path {:?}", manifest.overrides)))?;

    let required_files = manifest
        .files
        .iter()
        .map(|f| FileEntry {
            source: FileSource::Reference {
                project_id: f.project_id,
                file_id: f.file_id,
            },
            validation: FileValidation::default(),
            required: f.required,
        })
        .collect();

    Ok(PackDescriptor {
        format: PackFormat::CurseForge,
        name: manifest.name,
        minecraft_version: manifest.minecraft.version,
        loader,
        required_files,
        overrides_root: working_dir.join(overrides),
        client_overrides_root: None,
    })
}

fn from_modrinth(
    index: ModrinthIndex,
    working_dir: &Path,
    source: &Path,
) -> LauncherResult<PackDescriptor> {
    if let Some(game) = index.game.as_deref().filter(|g| *g != "minecraft") {
        return Err(malformed(source, format!("unexpected game {:?}", game)));
    }

    let minecraft_version = index
        .dependencies
        .get("minecraft")
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| malformed(source, "missing `minecraft` dependency"))?;

    let loader = loader::resolve_dependencies(&index.dependencies);

    let mut required_files = Vec::with_capacity(index.files.len());
    for file in index.files {
        if safe_relative_path(&file.path).is_none() {
            return Err(malformed(source, format!("unsafe file path {:?}", file.path)));
        }
        let required = file.needed_on_client();
        if !required {
            debug!("{} is not needed on the client", file.path);
        }
        required_files.push(FileEntry {
            validation: FileValidation {
                size: file.file_size,
                sha1: file.hashes.sha1,
                sha512: file.hashes.sha512,
            },
            source: FileSource::Direct {
                path: file.path,
                downloads: file.downloads,
            },
            required,
        });
    }

    Ok(PackDescriptor {
        format: PackFormat::Modrinth,
        name: index.name,
        minecraft_version,
        loader,
        required_files,
        overrides_root: working_dir.join(modrinth::OVERRIDES_DIR),
        client_overrides_root: Some(working_dir.join(modrinth::CLIENT_OVERRIDES_DIR)),
    })
}

/// Accept only plain relative paths that stay below their root.
pub(crate) fn safe_relative_path(raw: &str) -> Option<PathBuf> {
    let path = Path::new(raw);
    if raw.is_empty() {
        return None;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| path.to_path_buf())
}
