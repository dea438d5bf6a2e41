//! File-backed configuration store.
//!
//! Keys keep their hierarchical form (`/deis/platform/domain`) and are
//! persisted as one flat TOML table:
//!
//! ```toml
//! "/deis/platform/domain" = "example.com"
//! "/deis/scheduler/k8s/master" = "10.21.1.5"
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::port::ConfigStore;

type Table = BTreeMap<String, String>;

/// [`ConfigStore`] persisted to a TOML file.
///
/// A missing file reads as an empty store; the file and its parent
/// directory are created on the first `set`.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    write: Mutex<()>,
}

impl FileConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Table> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(toml::from_str(&content).map_err(ConfigError::Parse)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Table::new()),
            Err(e) => Err(ConfigError::ReadFile(e).into()),
        }
    }

    async fn save(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string(table).map_err(ConfigError::Serialize)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write.lock().await;
        let mut table = self.load().await?;
        table.insert(key.to_string(), value.to_string());
        self.save(&table).await?;
        debug!(key, path = %self.path.display(), "Stored configuration value");
        Ok(())
    }
}
