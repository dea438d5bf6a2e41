//! Recording [`Backend`] for sequencer tests.
//!
//! [`FakeBackend`] completes every operation after an optional delay and
//! records each call together with the number of operations still in flight
//! at the moment the call arrived. That count is what barrier tests assert
//! on: a strictly ordered run never issues a call while earlier work is
//! outstanding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Scheduler, Target};
use crate::error::{BackendError, Result};
use crate::port::{dispatch, spawn_one, Backend, EventSink, Extensions, PhaseBarrier};

/// Operations the fake records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Start,
    Stop,
    Destroy,
    Scale,
    Status,
    Journal,
    ListUnits,
    ListUnitFiles,
    Bootstrap,
    Teardown,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    /// Targets as displayed (`router@1`), or `name=count` for scale.
    pub targets: Vec<String>,
    /// Operations still in flight when this call arrived.
    pub outstanding: usize,
}

#[derive(Default)]
struct FakeState {
    calls: Mutex<Vec<Call>>,
    completed: Mutex<Vec<(Operation, String)>>,
    failures: Mutex<HashMap<(Operation, String), String>>,
    outstanding: AtomicUsize,
    delay: Mutex<Duration>,
}

impl FakeState {
    fn record(&self, operation: Operation, targets: Vec<String>) {
        let outstanding = self.outstanding.load(Ordering::SeqCst);
        self.calls.lock().push(Call {
            operation,
            targets,
            outstanding,
        });
    }

    fn failure(&self, operation: Operation, target: &str) -> Option<String> {
        self.failures
            .lock()
            .get(&(operation, target.to_string()))
            .cloned()
    }

    /// The future for one unit of work; counted as outstanding until it ends.
    fn work(
        self: &Arc<Self>,
        operation: Operation,
        target: String,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send + 'static {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let state = Arc::clone(self);
        let delay = *self.delay.lock();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = match state.failure(operation, &target) {
                Some(message) => Err(BackendError::new(target.clone(), message).into()),
                None => Ok(None),
            };
            state.completed.lock().push((operation, target));
            state.outstanding.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn lifecycle(
        self: &Arc<Self>,
        operation: Operation,
        targets: &[Target],
        barrier: &PhaseBarrier,
        events: &EventSink,
    ) {
        self.record(operation, targets.iter().map(ToString::to_string).collect());
        dispatch(targets, barrier, events, |target| {
            self.work(operation, target.to_string())
        });
    }
}

/// In-memory backend that records calls and optionally fails or delays them.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<FakeState>,
    extensions: Option<FakeExtensions>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every operation for `delay` before completing it.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock() = delay;
        self
    }

    /// Fail `operation` on `target` (displayed form, or component name for scale).
    pub fn failing(self, operation: Operation, target: &str, message: &str) -> Self {
        self.state
            .failures
            .lock()
            .insert((operation, target.to_string()), message.to_string());
        self
    }

    /// Advertise scheduler add-on support.
    pub fn with_extensions(mut self) -> Self {
        self.extensions = Some(FakeExtensions {
            state: Arc::clone(&self.state),
        });
        self
    }

    /// Every call in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }

    /// Calls of one operation in arrival order.
    pub fn calls_for(&self, operation: Operation) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    /// How many times `target` was passed to `operation`.
    pub fn times(&self, operation: Operation, target: &str) -> usize {
        self.calls_for(operation)
            .iter()
            .flat_map(|call| call.targets.iter())
            .filter(|t| *t == target)
            .count()
    }

    /// Finished units of work in completion order.
    pub fn completed(&self) -> Vec<(Operation, String)> {
        self.state.completed.lock().clone()
    }

    /// Operations currently in flight.
    pub fn outstanding(&self) -> usize {
        self.state.outstanding.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn create(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        self.state
            .lifecycle(Operation::Create, targets, barrier, events);
    }

    fn start(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        self.state
            .lifecycle(Operation::Start, targets, barrier, events);
    }

    fn stop(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        self.state.lifecycle(Operation::Stop, targets, barrier, events);
    }

    fn destroy(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        self.state
            .lifecycle(Operation::Destroy, targets, barrier, events);
    }

    fn scale(&self, component: &str, replicas: u64, barrier: &PhaseBarrier, events: &EventSink) {
        self.state
            .record(Operation::Scale, vec![format!("{component}={replicas}")]);
        spawn_one(
            barrier,
            events,
            self.state.work(Operation::Scale, component.to_string()),
        );
    }

    async fn status(&self, target: &Target) -> Result<()> {
        self.inspect(Operation::Status, target)
    }

    async fn journal(&self, target: &Target) -> Result<()> {
        self.inspect(Operation::Journal, target)
    }

    async fn list_units(&self) -> Result<()> {
        self.state.record(Operation::ListUnits, Vec::new());
        Ok(())
    }

    async fn list_unit_files(&self) -> Result<()> {
        self.state.record(Operation::ListUnitFiles, Vec::new());
        Ok(())
    }

    fn extensions(&self) -> Option<&dyn Extensions> {
        self.extensions
            .as_ref()
            .map(|extensions| extensions as &dyn Extensions)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

impl FakeBackend {
    fn inspect(&self, operation: Operation, target: &Target) -> Result<()> {
        let target = target.to_string();
        self.state.record(operation, vec![target.clone()]);
        match self.state.failure(operation, &target) {
            Some(message) => Err(BackendError::new(target, message).into()),
            None => Ok(()),
        }
    }
}

/// Add-on support sharing the fake's call log. Records the scheduler name.
#[derive(Clone)]
pub struct FakeExtensions {
    state: Arc<FakeState>,
}

impl Extensions for FakeExtensions {
    fn bootstrap(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink) {
        let name = scheduler.name().to_string();
        self.state.record(Operation::Bootstrap, vec![name.clone()]);
        spawn_one(barrier, events, self.state.work(Operation::Bootstrap, name));
    }

    fn teardown(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink) {
        let name = scheduler.name().to_string();
        self.state.record(Operation::Teardown, vec![name.clone()]);
        spawn_one(barrier, events, self.state.work(Operation::Teardown, name));
    }
}
