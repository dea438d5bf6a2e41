//! Settings loading and validation.
//!
//! Everything is optional: a missing default file yields defaults, and
//! `DEISCTL_*` environment variables override what the file says.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [output]
//! interval_ms = 500
//!
//! [fleet]
//! tunnel = "10.21.1.5"
//!
//! [store]
//! path = "/etc/deisctl/store.toml"
//!
//! [kubernetes]
//! api_port = 8080
//! ```

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::adapter::outbound::fleet::FleetConfig;
#[cfg(feature = "kubernetes")]
use crate::adapter::outbound::kubernetes::KubernetesConfig;
use crate::adapter::outbound::store::StoreConfig;
use crate::error::{ConfigError, Result};

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pause after each rendered progress line.
    pub interval_ms: u64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

impl OutputSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub output: OutputSettings,
    pub fleet: FleetConfig,
    pub store: StoreConfig,
    #[cfg(feature = "kubernetes")]
    pub kubernetes: KubernetesConfig,
}

impl Settings {
    /// Parse settings from TOML content and apply environment overrides.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut settings = Self::default();
                settings.apply_env();
                Ok(settings)
            }
            Err(e) => Err(ConfigError::ReadFile(e).into()),
        }
    }

    fn apply_env(&mut self) {
        self.fleet.apply_env();
        self.store.apply_env();
    }

    fn validate(&self) -> Result<()> {
        if self.fleet.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fleet.binary",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got \"{}\"", self.logging.format),
            }
            .into());
        }
        self.validate_kubernetes()
    }

    #[cfg(feature = "kubernetes")]
    fn validate_kubernetes(&self) -> Result<()> {
        if self.kubernetes.api_port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "kubernetes.api_port",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[cfg(not(feature = "kubernetes"))]
    fn validate_kubernetes(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse_toml("").unwrap();
        assert_eq!(settings.output.interval(), Duration::from_millis(500));
        assert_eq!(settings.fleet.binary, "fleetctl");
        assert_eq!(settings.logging.format, "pretty");
    }

    #[test]
    fn sections_are_read() {
        let settings = Settings::parse_toml(
            r#"
            [output]
            interval_ms = 0

            [fleet]
            binary = "/opt/bin/fleetctl"
            "#,
        )
        .unwrap();
        assert!(settings.output.interval().is_zero());
        assert_eq!(settings.fleet.binary, "/opt/bin/fleetctl");
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = Settings::parse_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.output.interval_ms, 500);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(dir.path().join("nope.toml")).is_err());
    }
}
