//! Special-target dispatcher: resolves operator tokens and runs the verb.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ScaleRequest, Selection, Target};
use crate::error::{ConfigError, ParseError, Result};
use crate::port::{component_key, ConfigStore, Reporter};

use super::sequencer::Sequencer;

/// Prefix of the platform-wide configuration keys.
pub const PLATFORM_PREFIX: &str = "/deis/platform/";

/// Required before the platform can be installed.
pub const DOMAIN_KEY: &str = "domain";

/// Optional; without it `deis run` is unavailable.
pub const SSH_KEY: &str = "sshPrivateKey";

/// Entry point for every CLI verb.
///
/// Expands `platform` and scheduler names into their plans, passes literal
/// targets through as a single phase, and runs the pre-flight checks that
/// belong to a verb rather than to the sequencing itself.
pub struct Dispatcher {
    sequencer: Sequencer,
    store: Arc<dyn ConfigStore>,
}

impl Dispatcher {
    pub fn new(sequencer: Sequencer, store: Arc<dyn ConfigStore>) -> Self {
        Self { sequencer, store }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Load unit definitions. `install platform` validates configuration first.
    pub async fn install<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let selection = Selection::parse(tokens)?;
        if selection == Selection::Platform {
            self.check_required_keys().await?;
        }
        self.sequencer.install(&selection).await
    }

    pub async fn start<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let selection = Selection::parse(tokens)?;
        self.sequencer.start(&selection).await
    }

    pub async fn stop<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let selection = Selection::parse(tokens)?;
        self.sequencer.stop(&selection).await
    }

    pub async fn uninstall<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let selection = Selection::parse(tokens)?;
        self.sequencer.uninstall(&selection).await
    }

    /// Act as if the operator ran `stop` and then `start`.
    pub async fn restart<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        self.stop(tokens).await?;
        self.start(tokens).await
    }

    /// Parse every `name=count` token before touching the backend.
    pub async fn scale<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let requests = tokens
            .iter()
            .map(|token| ScaleRequest::parse(token.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.sequencer.scale(&requests).await
    }

    pub async fn status<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let targets = parse_targets(tokens)?;
        self.sequencer.status(&targets).await
    }

    pub async fn journal<S: AsRef<str>>(&self, tokens: &[S]) -> Result<()> {
        let targets = parse_targets(tokens)?;
        self.sequencer.journal(&targets).await
    }

    pub async fn list_units(&self) -> Result<()> {
        self.sequencer.list_units().await
    }

    pub async fn list_unit_files(&self) -> Result<()> {
        self.sequencer.list_unit_files().await
    }

    /// Read `/deis/<component>/<key>` for each key, in order.
    pub async fn config_get<S: AsRef<str>>(
        &self,
        component: &str,
        keys: &[S],
    ) -> Result<Vec<(String, Option<String>)>> {
        check_component(component)?;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            if key.is_empty() || key.contains('=') {
                return Err(ParseError::malformed(key).into());
            }
            let value = self.store.get(&component_key(component, key)).await?;
            values.push((key.to_string(), value));
        }
        Ok(values)
    }

    /// Write `key=value` pairs under `/deis/<component>/`.
    ///
    /// Every pair is parsed before the first write.
    pub async fn config_set<S: AsRef<str>>(
        &self,
        component: &str,
        pairs: &[S],
    ) -> Result<Vec<(String, String)>> {
        check_component(component)?;
        let pairs = pairs
            .iter()
            .map(|pair| parse_pair(pair.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (key, value) in &pairs {
            self.store.set(&component_key(component, key), value).await?;
            info!(component, key = key.as_str(), "Configuration value set");
        }
        Ok(pairs)
    }

    /// The domain key must exist; a missing SSH key only warns.
    async fn check_required_keys(&self) -> Result<()> {
        if !self.store.exists(PLATFORM_PREFIX, DOMAIN_KEY).await? {
            return Err(ConfigError::missing(
                format!("{PLATFORM_PREFIX}{DOMAIN_KEY}"),
                "use: deisctl config platform set domain=<your-domain>",
            )
            .into());
        }

        if !self.store.exists(PLATFORM_PREFIX, SSH_KEY).await? {
            warn!(key = SSH_KEY, "Platform SSH key not configured");
            self.reporter().warning(
                "Missing sshPrivateKey, \"deis run\" will be unavailable. Use:\n\
                 deisctl config platform set sshPrivateKey=<path-to-key>",
            );
        } else {
            info!("Platform configuration present");
        }
        Ok(())
    }

    fn reporter(&self) -> &Arc<dyn Reporter> {
        self.sequencer.reporter()
    }
}

fn check_component(component: &str) -> std::result::Result<(), ParseError> {
    let target = Target::parse(component)?;
    if target.index().is_some() {
        return Err(ParseError::InvalidTarget {
            token: component.to_string(),
            reason: "configuration is per component, not per instance",
        });
    }
    Ok(())
}

fn parse_pair(pair: &str) -> std::result::Result<(String, String), ParseError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(ParseError::malformed(pair)),
    }
}

fn parse_targets<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Target>> {
    Ok(tokens
        .iter()
        .map(|token| Target::parse(token.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()?)
}
