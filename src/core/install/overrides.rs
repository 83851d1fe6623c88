// ─── Override Merger ───

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::progress::{begin_phase, ProgressSink};

/// Copy every file under `overrides_root` to the same relative path under
/// `install_root`, overwriting whatever is there.
///
/// A missing `overrides_root` is a no-op. The file list is collected and
/// sorted before the first copy so the progress maximum is exact. The first
/// failing copy aborts the merge.
pub fn merge_overrides(
    overrides_root: &Path,
    install_root: &Path,
    progress: &dyn ProgressSink,
) -> LauncherResult<usize> {
    if !overrides_root.is_dir() {
        debug!("No overrides at {:?}", overrides_root);
        return Ok(0);
    }

    let mut files = Vec::new();
    collect_files(overrides_root, &mut files)?;
    files.sort();

    begin_phase(progress, "Copying overrides", files.len() as u64);

    for (i, source) in files.iter().enumerate() {
        let relative = source
            .strip_prefix(overrides_root)
            .map_err(|e| LauncherError::Other(e.to_string()))?;
        let destination = install_root.join(relative);

        if let Some(name) = source.file_name() {
            progress.set_status(&format!("Copying {}", name.to_string_lossy()));
        }

        copy_one(source, &destination)?;
        progress.set_progress(i as u64 + 1);
    }

    info!(
        "Merged {} override files from {:?} into {:?}",
        files.len(),
        overrides_root,
        install_root
    );
    Ok(files.len())
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> LauncherResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| LauncherError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| LauncherError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| LauncherError::io(&path, e))?;

        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }

    Ok(())
}

fn copy_one(source: &Path, destination: &Path) -> LauncherResult<()> {
    let failed = |e| LauncherError::OverrideCopyFailed {
        path: source.to_path_buf(),
        source: e,
    };

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(failed)?;
    }
    std::fs::copy(source, destination).map_err(failed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::testing::RecordingProgress;
    use crate::core::progress::NullProgress;

    fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files = Vec::new();
        collect_files(root, &mut files).unwrap();
        files.sort();
        files
            .into_iter()
            .map(|p| {
                let bytes = std::fs::read(&p).unwrap();
                (p.strip_prefix(root).unwrap().to_path_buf(), bytes)
            })
            .collect()
    }

    fn seed(root: &Path) {
        std::fs::create_dir_all(root.join("config/deep")).unwrap();
        std::fs::write(root.join("config/a.txt"), b"alpha").unwrap();
        std::fs::write(root.join("config/deep/b.toml"), b"beta").unwrap();
        std::fs::write(root.join("options.txt"), b"gamma").unwrap();
    }

    #[test]
    fn missing_root_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let count =
            merge_overrides(&dir.path().join("absent"), &dir.path().join("game"), &NullProgress)
                .unwrap();
        assert_eq!(count, 0);
        assert!(!dir.path().join("game").exists());
    }

    #[test]
    fn copies_tree_preserving_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides");
        let game = dir.path().join("game");
        seed(&overrides);

        let progress = RecordingProgress::default();
        let count = merge_overrides(&overrides, &game, &progress).unwrap();

        assert_eq!(count, 3);
        assert_eq!(std::fs::read(game.join("config/deep/b.toml")).unwrap(), b"beta");
        assert_eq!(progress.last_progress(), Some(3));
        assert_eq!(progress.statuses()[0], "Copying overrides");
    }

    #[test]
    fn overrides_win_over_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides");
        let game = dir.path().join("game");
        seed(&overrides);
        std::fs::create_dir_all(game.join("config")).unwrap();
        std::fs::write(game.join("config/a.txt"), b"user edit").unwrap();

        merge_overrides(&overrides, &game, &NullProgress).unwrap();
        assert_eq!(std::fs::read(game.join("config/a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides");
        let game = dir.path().join("game");
        seed(&overrides);

        merge_overrides(&overrides, &game, &NullProgress).unwrap();
        let first = snapshot(&game);
        merge_overrides(&overrides, &game, &NullProgress).unwrap();

        assert_eq!(first, snapshot(&game));
    }

    #[test]
    fn blocked_destination_aborts_with_override_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides");
        let game = dir.path().join("game");
        seed(&overrides);
        // a plain file where a directory is needed
        std::fs::create_dir_all(&game).unwrap();
        std::fs::write(game.join("config"), b"not a dir").unwrap();

        let err = merge_overrides(&overrides, &game, &NullProgress).unwrap_err();
        assert!(matches!(err, LauncherError::OverrideCopyFailed { .. }));
    }
}
