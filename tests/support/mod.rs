#![allow(dead_code)]

pub mod architecture;

use std::sync::Arc;
use std::time::Duration;

use deisctl::application::{Dispatcher, Sequencer};
use deisctl::testkit::{FakeBackend, MemoryConfigStore, RecordingReporter};

/// Sequencer over `backend` that renders without pausing.
pub fn sequencer(backend: &FakeBackend) -> (Sequencer, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let sequencer = Sequencer::new(Arc::new(backend.clone()), reporter.clone())
        .with_interval(Duration::ZERO);
    (sequencer, reporter)
}

/// Dispatcher over `backend` and `store`.
pub fn dispatcher(
    backend: &FakeBackend,
    store: &MemoryConfigStore,
) -> (Dispatcher, Arc<RecordingReporter>) {
    let (sequencer, reporter) = sequencer(backend);
    (
        Dispatcher::new(sequencer, Arc::new(store.clone())),
        reporter,
    )
}

/// A store with the keys `install platform` requires.
pub fn configured_store() -> MemoryConfigStore {
    MemoryConfigStore::new()
        .with("/deis/platform/domain", "example.com")
        .with("/deis/platform/sshPrivateKey", "/home/core/.ssh/id_rsa")
}
