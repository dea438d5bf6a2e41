use thiserror::Error;

/// A target or argument token that does not match its grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not parse: {token}")]
    Malformed { token: String },

    #[error("invalid target '{token}': {reason}")]
    InvalidTarget { token: String, reason: &'static str },

    #[error("'{name}' expands to a full plan and must be the only target")]
    ReservedTarget { name: String },

    #[error("no targets specified")]
    NoTargets,
}

impl ParseError {
    pub(crate) fn malformed(token: impl Into<String>) -> Self {
        Self::Malformed {
            token: token.into(),
        }
    }
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required key {key}")]
    MissingKey { key: String, hint: Option<String> },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),
}

impl ConfigError {
    /// Missing key with an operator hint on how to set it.
    pub fn missing(key: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingKey {
            key: key.into(),
            hint: Some(hint.into()),
        }
    }

    /// Operator-facing remediation, when one exists.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::MissingKey { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

/// A failure reported by a backend for a single target or operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{target}: {message}")]
pub struct BackendError {
    pub target: String,
    pub message: String,
}

impl BackendError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Unsupported(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "kubernetes")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "kubernetes")]
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("run aborted without a reported failure")]
    Aborted,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_carries_hint() {
        let err = ConfigError::missing("/deis/platform/domain", "set it");
        assert_eq!(err.to_string(), "missing required key /deis/platform/domain");
        assert_eq!(err.hint(), Some("set it"));
    }

    #[test]
    fn backend_error_names_target() {
        let err: Error = BackendError::new("registry", "unit failed").into();
        assert_eq!(err.to_string(), "registry: unit failed");
    }
}
