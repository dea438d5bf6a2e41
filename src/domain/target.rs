//! Component references parsed from operator tokens.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// An addressable platform component, optionally indexed for replicas.
///
/// `router@1` is the first routing mesh replica; `controller` has no index.
/// Equality is by `(name, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    name: String,
    index: Option<u32>,
}

impl Target {
    /// Create an unindexed target without validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Create a replica target (`name@index`).
    pub fn indexed(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Parse a `name` or `name@index` token.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let invalid = |reason| ParseError::InvalidTarget {
            token: token.to_string(),
            reason,
        };

        let (name, index) = match token.split_once('@') {
            Some((name, index)) => {
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("replica index must be a number"));
                }
                let index = index
                    .parse::<u32>()
                    .map_err(|_| invalid("replica index out of range"))?;
                (name, Some(index))
            }
            None => (token, None),
        };

        if !is_component_name(name) {
            return Err(invalid(
                "name must start with a letter and contain only lowercase letters, digits and '-'",
            ));
        }

        Ok(Self {
            name: name.to_string(),
            index,
        })
    }

    /// Component name without the replica index.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replica index, if any.
    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}@{}", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for Target {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// A `name=count` replica request for a scalable component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRequest {
    component: String,
    replicas: u64,
}

impl ScaleRequest {
    /// Parse `<lowercase-name>=<non-negative integer>`.
    ///
    /// The name is not normalized and the count has no upper bound here;
    /// backends may still reject it.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let (component, count) = token
            .split_once('=')
            .ok_or_else(|| ParseError::malformed(token))?;

        let name_ok =
            !component.is_empty() && component.chars().all(|c| c.is_ascii_lowercase() || c == '-');
        let count_ok = !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit());
        if !name_ok || !count_ok {
            return Err(ParseError::malformed(token));
        }

        let replicas = count
            .parse::<u64>()
            .map_err(|_| ParseError::malformed(token))?;

        Ok(Self {
            component: component.to_string(),
            replicas,
        })
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn replicas(&self) -> u64 {
        self.replicas
    }
}

impl fmt::Display for ScaleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.component, self.replicas)
    }
}

/// Parse a scale token into `(component, replicas)`.
pub fn parse_scale_target(token: &str) -> Result<(String, u64), ParseError> {
    ScaleRequest::parse(token).map(|request| (request.component, request.replicas))
}
