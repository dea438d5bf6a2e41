//! Configuration store adapters.

pub mod file;
pub mod settings;

pub use file::FileConfigStore;
pub use settings::StoreConfig;
