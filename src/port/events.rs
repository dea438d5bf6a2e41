//! The event stream shared by one run: progress lines and failures.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::error::Error;

/// A message delivered to the run's aggregator.
#[derive(Debug)]
pub enum Event {
    Heading(String),
    Progress(String),
    Warning(String),
    Failure(Error),
}

struct SinkInner {
    tx: Mutex<Option<mpsc::UnboundedSender<Event>>>,
    aborted: watch::Sender<bool>,
}

/// Multi-writer handle on a run's event stream.
///
/// Sends never block. The run owner closes the sink exactly once; the sender
/// is taken out on close, so later sends from lingering operations are
/// dropped rather than racing the reader.
#[derive(Clone)]
pub struct EventSink {
    inner: Arc<SinkInner>,
}

/// Single reader side of a run's event stream.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Event>,
}

/// Open a fresh stream for one run.
pub fn channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (aborted, _) = watch::channel(false);
    let sink = EventSink {
        inner: Arc::new(SinkInner {
            tx: Mutex::new(Some(tx)),
            aborted,
        }),
    };
    (sink, EventStream { rx })
}

impl EventSink {
    /// Report a run title or phase heading.
    pub fn heading(&self, title: impl Into<String>) {
        self.send(Event::Heading(title.into()));
    }

    /// Report a progress line.
    pub fn progress(&self, line: impl Into<String>) {
        self.send(Event::Progress(line.into()));
    }

    /// Report a non-fatal warning.
    pub fn warn(&self, message: impl Into<String>) {
        self.send(Event::Warning(message.into()));
    }

    /// Report a failure. The run stops advancing after the first one.
    ///
    /// The failure is queued before the abort flag is raised, under the same
    /// lock `close` takes, so a run that observes the abort and closes the
    /// stream can never drop the failure that caused it.
    pub fn fail(&self, error: impl Into<Error>) {
        let tx = self.inner.tx.lock();
        if let Some(tx) = tx.as_ref() {
            let _ = tx.send(Event::Failure(error.into()));
        }
        self.inner.aborted.send_replace(true);
    }

    /// Whether a failure has been reported on this run.
    pub fn is_aborted(&self) -> bool {
        *self.inner.aborted.borrow()
    }

    /// Resolve once a failure has been reported.
    pub async fn aborted(&self) {
        let mut rx = self.inner.aborted.subscribe();
        // The sender lives as long as `self`, so this only ends on abort.
        let _ = rx.wait_for(|aborted| *aborted).await;
    }

    /// Whether the owner has closed the stream.
    pub fn is_closed(&self) -> bool {
        self.inner.tx.lock().is_none()
    }

    /// End the stream. The reader sees end-of-stream after draining.
    pub fn close(&self) {
        self.inner.tx.lock().take();
    }

    fn send(&self, event: Event) {
        if let Some(tx) = self.inner.tx.lock().as_ref() {
            // The reader may already have stopped on an earlier failure.
            let _ = tx.send(event);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("closed", &self.is_closed())
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

impl EventStream {
    /// Next event, or `None` once the sink is closed and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
