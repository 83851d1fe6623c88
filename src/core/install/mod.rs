pub mod fetch;
pub mod lookup;
pub mod orchestrator;
pub mod overrides;

pub use fetch::{DependencyFetcher, FetchReport, FetchSummary};
pub use lookup::{CurseForgeApi, FileLookup};
pub use orchestrator::{InstallFailure, InstallStage, InstallationResult, PackInstaller};
pub use overrides::merge_overrides;
