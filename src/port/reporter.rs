//! Operator-visible output port.

use crate::error::Error;

/// Renders a run's events for the operator.
///
/// The aggregator calls it from a single task, in stream order.
pub trait Reporter: Send + Sync {
    /// A run title or phase heading.
    fn heading(&self, title: &str);

    /// A progress line reported by the backend.
    fn progress(&self, line: &str);

    /// A non-fatal warning.
    fn warning(&self, message: &str);

    /// The failure that ended the run.
    fn failure(&self, error: &Error);

    /// The run completed; `hints` are follow-up suggestions.
    fn finished(&self, hints: &[String]);
}
