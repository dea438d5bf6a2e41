//! Command-line adapter: argument parsing, verb handlers and terminal output.

pub mod command;
pub mod diagnostic;
pub mod handler;
pub mod output;
pub mod paths;
pub mod reporter;

pub use command::Cli;
pub use diagnostic::CommandDiagnostic;
pub use reporter::TerminalReporter;
