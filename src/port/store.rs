//! Cluster-wide configuration store port.

use async_trait::async_trait;

use crate::error::Result;

/// Root of the platform keyspace.
pub const KEY_ROOT: &str = "/deis";

/// Build `/deis/<component>/<key>`.
pub fn component_key(component: &str, key: &str) -> String {
    format!("{KEY_ROOT}/{component}/{key}")
}

/// Hierarchical key/value store shared by every node of the cluster.
///
/// Keys are absolute paths such as `/deis/platform/domain`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Value at `key`, if set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Whether `key` exists under `prefix` (e.g. `"/deis/platform/"`, `"domain"`).
    async fn exists(&self, prefix: &str, key: &str) -> Result<bool> {
        let path = format!("{}/{}", prefix.trim_end_matches('/'), key);
        Ok(self.get(&path).await?.is_some())
    }
}
