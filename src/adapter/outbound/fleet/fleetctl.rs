//! Thin wrapper around the `fleetctl` binary.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{BackendError, Result};

use super::settings::FleetConfig;

/// Runs `fleetctl` subcommands, optionally through an SSH tunnel.
#[derive(Debug, Clone)]
pub struct Fleetctl {
    binary: String,
    tunnel: Option<String>,
}

impl Fleetctl {
    pub fn new(config: &FleetConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            tunnel: config.tunnel.clone(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary);
        if let Some(tunnel) = &self.tunnel {
            command.arg("--tunnel").arg(tunnel);
        }
        command.args(args);
        command
    }

    /// Run to completion and capture stdout.
    ///
    /// A non-zero exit becomes a [`BackendError`] for `subject` carrying
    /// fleetctl's stderr.
    pub async fn output(&self, subject: &str, args: &[&str]) -> Result<String> {
        debug!(binary = %self.binary, ?args, "Running fleetctl");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BackendError::new(subject, format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("fleetctl exited with {}", output.status)
            } else {
                stderr
            };
            return Err(BackendError::new(subject, message).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run attached to the operator's terminal.
    pub async fn interactive(&self, subject: &str, args: &[&str]) -> Result<()> {
        debug!(binary = %self.binary, ?args, "Running fleetctl (attached)");
        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| BackendError::new(subject, format!("failed to run {}: {e}", self.binary)))?;

        if !status.success() {
            return Err(BackendError::new(subject, format!("fleetctl exited with {status}")).into());
        }
        Ok(())
    }
}
