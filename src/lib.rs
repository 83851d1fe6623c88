pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{ErrorKind, LauncherError, LauncherResult};
pub use crate::core::install::{InstallFailure, InstallStage, InstallationResult};
pub use crate::core::loaders::{InstallContext, Installers, LoaderInstaller, VersionInstaller};
pub use crate::core::profile::Profile;
pub use crate::core::progress::{LogProgress, NullProgress, ProgressSink};
pub use crate::core::state::{Launcher, LauncherSettings};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,packlauncher_lib=debug")),
        )
        .try_init();
}
