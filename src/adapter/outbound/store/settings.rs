//! Configuration store settings.

use std::path::PathBuf;

use serde::Deserialize;

/// Overrides the store file location.
pub const STORE_ENV: &str = "DEISCTL_STORE";

/// `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file; `~/.deisctl/store.toml` when unset.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Apply `DEISCTL_STORE`.
    pub fn apply_env(&mut self) {
        if let Some(path) = std::env::var(STORE_ENV).ok().filter(|v| !v.is_empty()) {
            self.path = Some(PathBuf::from(path));
        }
    }
}
