//! Progress aggregator: renders a run's event stream in order.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::port::{Event, EventStream, Reporter};

/// Default pause after each rendered event.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Drain `stream` into `reporter` until the stream ends or fails.
///
/// Returns `Ok(())` once the owning run closes the stream, or the first
/// failure it sees; later events are not read. The pause after each event
/// only paces the output.
pub async fn aggregate(
    mut stream: EventStream,
    reporter: Arc<dyn Reporter>,
    interval: Duration,
) -> Result<()> {
    while let Some(event) = stream.recv().await {
        match event {
            Event::Heading(title) => reporter.heading(&title),
            Event::Progress(line) => reporter.progress(&line),
            Event::Warning(message) => reporter.warning(&message),
            Event::Failure(error) => {
                debug!(error = %error, "Run failed, aggregator stopping");
                reporter.failure(&error);
                return Err(error);
            }
        }
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, Error};
    use crate::port::channel;
    use crate::testkit::RecordingReporter;

    #[tokio::test]
    async fn renders_until_close() {
        let reporter = Arc::new(RecordingReporter::new());
        let (sink, stream) = channel();
        sink.heading("Storage subsystem...");
        sink.progress("deis-store-monitor.service: started");
        sink.progress("deis-store-daemon.service: waiting...");
        sink.close();

        aggregate(stream, reporter.clone(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(
            reporter.lines(),
            [
                "Storage subsystem...",
                "deis-store-monitor.service: started",
                "deis-store-daemon.service: waiting...",
            ]
        );
        assert_eq!(reporter.headings(), ["Storage subsystem..."]);
    }

    #[tokio::test]
    async fn first_failure_ends_the_loop() {
        let reporter = Arc::new(RecordingReporter::new());
        let (sink, stream) = channel();
        sink.heading("Control plane...");
        sink.fail(BackendError::new("registry", "stop failed"));
        sink.fail(BackendError::new("cache", "stop failed"));
        sink.heading("Logging subsystem...");
        sink.close();

        let err = aggregate(stream, reporter.clone(), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(ref e) if e.target == "registry"));
        assert_eq!(reporter.lines(), ["Control plane..."]);
        assert_eq!(reporter.failures(), ["registry: stop failed"]);
    }
}
