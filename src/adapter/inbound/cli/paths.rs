//! Path utilities for deisctl.
//!
//! Local state lives under `~/.deisctl/`:
//! - `~/.deisctl/config.toml` - settings
//! - `~/.deisctl/store.toml` - file-backed configuration store

use std::path::PathBuf;

/// Returns the deisctl home directory (`~/.deisctl/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deisctl")
}

/// Returns the default settings path (`~/.deisctl/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default store path (`~/.deisctl/store.toml`).
pub fn default_store() -> PathBuf {
    home_dir().join("store.toml")
}
