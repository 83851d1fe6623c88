pub mod archive;
pub mod curseforge;
pub mod descriptor;
pub mod loader;
pub mod modrinth;

pub use archive::{extract, working_dir_for};
pub use descriptor::{parse, FileEntry, FileSource, PackDescriptor, PackFormat};
pub use loader::{LoaderKind, LoaderSpec, VersionSpec};
