// ─── Archive Extractor ───
// Materializes a pack archive into a private working directory whose name is
// derived from the archive's base name.

use std::fs::File;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};

const WORK_DIR_MODULUS: u64 = 100_000_000;

/// Deterministic working directory for `archive` under `work_root`.
///
/// The name is the SHA-1 of the archive's base name reduced modulo 10^8, so
/// repeated installs of the same archive land in the same place.
pub fn working_dir_for(work_root: &Path, archive: &Path) -> PathBuf {
    let base_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let digest = Sha1::digest(base_name.as_bytes());
    let reduced = digest
        .iter()
        .fold(0u64, |acc, byte| (acc * 256 + u64::from(*byte)) % WORK_DIR_MODULUS);

    work_root.join(reduced.to_string())
}

/// Fully extract `archive` into its working directory and return that path.
///
/// A directory left behind by an earlier failed run is removed first.
/// Nothing is cleaned up on success; that is the caller's job.
pub fn extract(archive: &Path, work_root: &Path) -> LauncherResult<PathBuf> {
    if !archive.is_file() {
        return Err(LauncherError::ArchiveNotFound(archive.to_path_buf()));
    }

    let file = File::open(archive).map_err(|e| LauncherError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| LauncherError::ArchiveCorrupt {
        path: archive.to_path_buf(),
        source,
    })?;

    let working_dir = working_dir_for(work_root, archive);
    if working_dir.exists() {
        debug!("Removing stale working directory {:?}", working_dir);
        std::fs::remove_dir_all(&working_dir).map_err(|e| LauncherError::io(&working_dir, e))?;
    }
    std::fs::create_dir_all(&working_dir).map_err(|e| LauncherError::io(&working_dir, e))?;

    // `extract` rejects entries that would escape the target directory.
    zip.extract(&working_dir)
        .map_err(|source| LauncherError::ArchiveCorrupt {
            path: archive.to_path_buf(),
            source,
        })?;

    info!(
        "Extracted {} entries from {:?} into {:?}",
        zip.len(),
        archive,
        working_dir
    );
    Ok(working_dir)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;

    /// Write a zip at `path` containing `(name, contents)` pairs.
    pub fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::write_zip;
    use super::*;

    #[test]
    fn working_dir_depends_only_on_base_name() {
        let root = Path::new("/tmp/work");
        let a = working_dir_for(root, Path::new("/downloads/pack.mrpack"));
        let b = working_dir_for(root, Path::new("/elsewhere/pack.mrpack"));
        let c = working_dir_for(root, Path::new("/downloads/other.mrpack"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        let name: u64 = a.file_name().unwrap().to_str().unwrap().parse().unwrap();
        assert!(name < WORK_DIR_MODULUS);
    }

    #[test]
    fn extracts_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("manifest.json", b"{}"),
                ("overrides/config/a.txt", b"alpha"),
            ],
        );

        let working = extract(&archive, &dir.path().join("work")).unwrap();

        assert_eq!(
            std::fs::read(working.join("overrides/config/a.txt")).unwrap(),
            b"alpha"
        );
        assert!(working.join("manifest.json").is_file());
    }

    #[test]
    fn stale_files_from_a_previous_run_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let work_root = dir.path().join("work");
        let archive = dir.path().join("pack.zip");
        write_zip(&archive, &[("manifest.json", b"{}")]);

        let stale = working_dir_for(&work_root, &archive).join("leftover.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, b"old").unwrap();

        extract(&archive, &work_root).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn missing_archive_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(&dir.path().join("nope.zip"), dir.path()).unwrap_err();
        assert!(matches!(err, LauncherError::ArchiveNotFound(_)));
    }

    #[test]
    fn garbage_archive_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, LauncherError::ArchiveCorrupt { .. }));
    }
}
