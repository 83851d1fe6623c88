pub mod launcher;
pub mod settings;

pub use launcher::Launcher;
pub use settings::LauncherSettings;
