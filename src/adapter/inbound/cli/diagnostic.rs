//! Miette rendering for errors that end a command.

use std::fmt;

use miette::Diagnostic;

use crate::error::{ConfigError, Error, ParseError};

/// Wraps a crate [`Error`] with a diagnostic code and operator help.
#[derive(Debug)]
pub struct CommandDiagnostic {
    error: Error,
}

impl CommandDiagnostic {
    #[must_use]
    pub fn new(error: Error) -> Self {
        Self { error }
    }

    fn code_name(&self) -> &'static str {
        match &self.error {
            Error::Parse(_) => "deisctl::parse",
            Error::Config(_) => "deisctl::config",
            Error::Backend(_) => "deisctl::backend",
            Error::Unsupported(_) => "deisctl::unsupported",
            #[cfg(feature = "kubernetes")]
            Error::Http(_) | Error::Url(_) => "deisctl::http",
            Error::Json(_) => "deisctl::json",
            Error::Io(_) => "deisctl::io",
            Error::Task(_) | Error::Aborted => "deisctl::internal",
        }
    }

    fn help_text(&self) -> Option<String> {
        match &self.error {
            Error::Config(config) => match config {
                ConfigError::MissingKey { .. } => config.hint().map(str::to_string),
                ConfigError::Parse(_) | ConfigError::InvalidValue { .. } => {
                    Some("check ~/.deisctl/config.toml or the file passed with --config".to_string())
                }
                _ => None,
            },
            Error::Parse(ParseError::ReservedTarget { name }) => {
                Some(format!("run it on its own, e.g. `deisctl start {name}`"))
            }
            Error::Parse(ParseError::Malformed { .. }) => {
                Some("expected `<component>=<count>` or `<key>=<value>`".to_string())
            }
            Error::Unsupported(_) => Some("only the router can be scaled".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for CommandDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for CommandDiagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl Diagnostic for CommandDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_name()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }
}
