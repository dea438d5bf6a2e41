//! Kubernetes scheduler add-ons.

pub mod dns;
pub mod manifest;
pub mod settings;

pub use dns::{KubeDnsAddon, MASTER_KEY};
pub use settings::KubernetesConfig;
