pub mod model;
pub mod store;

pub use model::{Profile, ProfileRecord};
pub use store::ProfileStore;
