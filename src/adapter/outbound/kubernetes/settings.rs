//! Kubernetes resource API settings.

use serde::Deserialize;

/// `[kubernetes]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Port the API server listens on at the scheduler master.
    pub api_port: u16,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            api_port: 8080,
            timeout_ms: 10_000,
        }
    }
}
