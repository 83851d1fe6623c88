use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installation pipeline and profile store.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("No download source for {0}")]
    NoDownloadSource(String),

    #[error("Filename lookup failed for project {project_id} file {file_id}: {reason}")]
    NameLookup {
        project_id: u64,
        file_id: u64,
        reason: String,
    },

    #[error("{count} required file(s) failed to download: {}", describe_failures(.failures))]
    PartialFetchFailure {
        count: usize,
        failures: Vec<FailedEntry>,
    },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {path:?}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Size mismatch for {path:?}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("Archive not found: {0:?}")]
    ArchiveNotFound(PathBuf),

    #[error("Archive {path:?} cannot be opened: {source}")]
    ArchiveCorrupt {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Manifest ────────────────────────────────────────
    #[error("No pack manifest found in {0:?}")]
    ManifestMissing(PathBuf),

    #[error("Malformed pack manifest {path:?}: {reason}")]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Loader ──────────────────────────────────────────
    #[error("Invalid loader identifier: {0}")]
    InvalidLoaderId(String),

    #[error("Invalid version spec: {0}")]
    InvalidVersionSpec(String),

    #[error("Unsupported loader: {0}")]
    UnsupportedLoader(String),

    #[error("Loader error: {0}")]
    Loader(String),

    #[error("Loader API unreachable: {0}")]
    LoaderApi(String),

    #[error("Version {0} is not known")]
    UnknownVersion(String),

    // ── Overrides ───────────────────────────────────────
    #[error("Failed to copy override {path:?}: {source}")]
    OverrideCopyFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Profile ─────────────────────────────────────────
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile already exists: {0}")]
    ProfileAlreadyExists(String),

    #[error("Invalid profile name: {0:?}")]
    InvalidProfileName(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

/// Coarse failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Malformed,
    Unsupported,
    NetworkFailure,
    PartialFetchFailure,
    IoFailure,
}

impl LauncherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LauncherError::ArchiveNotFound(_)
            | LauncherError::ManifestMissing(_)
            | LauncherError::ProfileNotFound(_)
            | LauncherError::UnknownVersion(_)
            | LauncherError::Loader(_) => ErrorKind::NotFound,

            LauncherError::ArchiveCorrupt { .. }
            | LauncherError::Zip(_)
            | LauncherError::ManifestMalformed { .. }
            | LauncherError::Json(_)
            | LauncherError::InvalidLoaderId(_)
            | LauncherError::InvalidVersionSpec(_)
            | LauncherError::InvalidProfileName(_)
            | LauncherError::ProfileAlreadyExists(_) => ErrorKind::Malformed,

            LauncherError::UnsupportedLoader(_) => ErrorKind::Unsupported,

            LauncherError::Http(_)
            | LauncherError::DownloadFailed { .. }
            | LauncherError::NoDownloadSource(_)
            | LauncherError::NameLookup { .. }
            | LauncherError::HashMismatch { .. }
            | LauncherError::SizeMismatch { .. }
            | LauncherError::LoaderApi(_) => ErrorKind::NetworkFailure,

            LauncherError::PartialFetchFailure { .. } => ErrorKind::PartialFetchFailure,

            LauncherError::Io { .. }
            | LauncherError::OverrideCopyFailed { .. }
            | LauncherError::Other(_) => ErrorKind::IoFailure,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One required file that could not be fetched, with its cause.
#[derive(Debug)]
pub struct FailedEntry {
    /// Destination path when known, otherwise a `project:file` reference.
    pub entry: String,
    pub cause: LauncherError,
}

impl LauncherError {
    pub fn partial_fetch(failures: Vec<FailedEntry>) -> Self {
        LauncherError::PartialFetchFailure {
            count: failures.len(),
            failures,
        }
    }
}

fn describe_failures(failures: &[FailedEntry]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.entry, f.cause))
        .collect::<Vec<_>>()
        .join(", ")
}
