//! Terminal [`Reporter`].

use tracing::debug;

use crate::error::Error;
use crate::port::Reporter;

use super::output;

/// Renders a run's events with the [`output`] printers.
///
/// Titles and phase headings print as sections, backend lines as steps.
/// The failure that ends a run is returned to the caller and rendered once
/// there, so it is only logged here.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn heading(&self, title: &str) {
        output::section(title);
    }

    fn progress(&self, line: &str) {
        output::step(line);
    }

    fn warning(&self, message: &str) {
        output::warning(message);
    }

    fn failure(&self, error: &Error) {
        debug!(error = %error, "Run failure reported");
    }

    fn finished(&self, hints: &[String]) {
        output::success("Done.");
        for hint in hints {
            output::hint(hint);
        }
    }
}
