// ─── PackLauncher Core ───
// Modpack installation and version resolution.
//
// Architecture:
//   core/
//     error       — LauncherError + coarse ErrorKind
//     http        — Shared HTTP client setup
//     progress    — Status/progress sink seen by every long-running step
//     downloader/ — Validated single-file downloads
//     pack/       — Archive extraction + manifest parsing (CurseForge, Modrinth)
//     install/    — Overrides, dependency fetch, install orchestration
//     loaders/    — Installer collaborators and loader dispatch
//     catalog/    — Known game and loader versions, cached offline
//     profile/    — Named installations on disk
//     state/      — Settings + the Launcher facade

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod loaders;
pub mod pack;
pub mod profile;
pub mod progress;
pub mod state;
