//! Fleet backend settings.

use std::path::PathBuf;

use serde::Deserialize;

/// Overrides the unit search path.
pub const UNITS_ENV: &str = "DEISCTL_UNITS";

/// Overrides the fleet tunnel host.
pub const TUNNEL_ENV: &str = "DEISCTL_TUNNEL";

/// Site-wide unit directory, searched last.
pub const SYSTEM_UNITS: &str = "/var/lib/deis/units";

/// `[fleet]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// `fleetctl` binary, resolved through `PATH` when not absolute.
    pub binary: String,
    /// SSH tunnel host passed as `--tunnel`.
    pub tunnel: Option<String>,
    /// Directory searched before the defaults.
    pub units: Option<PathBuf>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            binary: "fleetctl".to_string(),
            tunnel: None,
            units: None,
        }
    }
}

impl FleetConfig {
    /// Apply `DEISCTL_TUNNEL` and `DEISCTL_UNITS`.
    pub fn apply_env(&mut self) {
        if let Some(tunnel) = std::env::var(TUNNEL_ENV).ok().filter(|v| !v.is_empty()) {
            self.tunnel = Some(tunnel);
        }
        if let Some(units) = std::env::var(UNITS_ENV).ok().filter(|v| !v.is_empty()) {
            self.units = Some(PathBuf::from(units));
        }
    }

    /// Directories searched for unit files, in order.
    pub fn search_path(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(3);
        if let Some(units) = &self.units {
            dirs.push(units.clone());
        }
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join(".deis").join("units"));
        }
        dirs.push(PathBuf::from(SYSTEM_UNITS));
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_searched_first() {
        let config = FleetConfig {
            units: Some(PathBuf::from("/tmp/units")),
            ..FleetConfig::default()
        };
        let path = config.search_path();
        assert_eq!(path.first(), Some(&PathBuf::from("/tmp/units")));
        assert_eq!(path.last(), Some(&PathBuf::from(SYSTEM_UNITS)));
    }

    #[test]
    fn parses_from_toml() {
        let config: FleetConfig = toml::from_str("tunnel = \"10.0.0.2\"").unwrap();
        assert_eq!(config.binary, "fleetctl");
        assert_eq!(config.tunnel.as_deref(), Some("10.0.0.2"));
    }
}
