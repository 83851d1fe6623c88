use std::path::Path;

use crate::core::progress::ProgressSink;

/// Everything a loader installer needs for one call.
pub struct InstallContext<'a> {
    pub minecraft_version: &'a str,
    pub loader_version: &'a str,
    /// The profile's game directory.
    pub target_dir: &'a Path,
    pub progress: &'a dyn ProgressSink,
}
