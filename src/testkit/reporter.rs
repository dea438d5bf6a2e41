//! [`Reporter`] that records what it was asked to render.

use parking_lot::Mutex;

use crate::error::Error;
use crate::port::Reporter;

#[derive(Debug, Default)]
struct Recorded {
    lines: Vec<String>,
    headings: Vec<String>,
    warnings: Vec<String>,
    failures: Vec<String>,
    finished: Option<Vec<String>>,
}

/// Captures progress lines, warnings and failures in arrival order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    recorded: Mutex<Recorded>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress lines, including titles and phase headings.
    pub fn lines(&self) -> Vec<String> {
        self.recorded.lock().lines.clone()
    }

    /// Titles and phase headings only.
    pub fn headings(&self) -> Vec<String> {
        self.recorded.lock().headings.clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.recorded.lock().warnings.clone()
    }

    /// Failures rendered as their display strings.
    pub fn failures(&self) -> Vec<String> {
        self.recorded.lock().failures.clone()
    }

    /// Hints passed to `finished`, or `None` if the run never finished.
    pub fn finished_hints(&self) -> Option<Vec<String>> {
        self.recorded.lock().finished.clone()
    }
}

impl Reporter for RecordingReporter {
    fn heading(&self, title: &str) {
        let mut recorded = self.recorded.lock();
        recorded.lines.push(title.to_string());
        recorded.headings.push(title.to_string());
    }

    fn progress(&self, line: &str) {
        self.recorded.lock().lines.push(line.to_string());
    }

    fn warning(&self, message: &str) {
        self.recorded.lock().warnings.push(message.to_string());
    }

    fn failure(&self, error: &Error) {
        self.recorded.lock().failures.push(error.to_string());
    }

    fn finished(&self, hints: &[String]) {
        self.recorded.lock().finished = Some(hints.to_vec());
    }
}
