//! Backend Contract: the boundary between the sequencer and a scheduler.
//!
//! Lifecycle operations (`create`, `start`, `stop`, `destroy`, `scale`)
//! schedule their work and return immediately. For every unit of work they
//! schedule they take a [`Permit`](super::Permit) from the phase barrier and
//! keep it until the work is finished; results go to the run's
//! [`EventSink`] as progress lines or failures. Taking the permit before
//! spawning and holding it inside the task is what guarantees the barrier
//! is released exactly once per target, even on error.
//!
//! Enumeration and inspection (`list_units`, `status`, ...) are plain async
//! calls the caller awaits.

use std::future::Future;

use async_trait::async_trait;

use crate::domain::{Scheduler, Target};
use crate::error::Result;

use super::barrier::PhaseBarrier;
use super::events::EventSink;

/// Pluggable execution engine driven by the phase sequencer.
///
/// # Implementation Notes
///
/// - `start` may be called for a target that is already starting; it must
///   tolerate that.
/// - A missing release deadlocks the sequencer; use [`dispatch`] unless
///   there is a reason not to.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Install unit definitions so the targets become startable.
    fn create(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink);

    /// Start installed targets.
    fn start(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink);

    /// Stop running targets.
    fn stop(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink);

    /// Remove unit definitions; the inverse of `create`.
    fn destroy(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink);

    /// Apply a replica count to a scalable component.
    fn scale(&self, component: &str, replicas: u64, barrier: &PhaseBarrier, events: &EventSink);

    /// Print the status of one target.
    async fn status(&self, target: &Target) -> Result<()>;

    /// Print the log journal of one target.
    async fn journal(&self, target: &Target) -> Result<()>;

    /// Print the installed units.
    async fn list_units(&self) -> Result<()>;

    /// Print the contents of the defined unit files.
    async fn list_unit_files(&self) -> Result<()>;

    /// Optional scheduler-specific operations.
    fn extensions(&self) -> Option<&dyn Extensions> {
        None
    }

    /// Backend name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Scheduler add-ons run outside the generic unit lifecycle.
///
/// Same release and event rules as the lifecycle operations.
pub trait Extensions: Send + Sync {
    /// Deploy the scheduler's add-ons after its control components start.
    fn bootstrap(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink);

    /// Remove the scheduler's add-ons before its control components go.
    fn teardown(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink);
}

/// Spawn one task per target, each holding a barrier permit until done.
///
/// `Ok(Some(line))` is reported as progress, `Err` as a failure; the permit
/// is released after the outcome has been reported.
pub fn dispatch<F, Fut>(targets: &[Target], barrier: &PhaseBarrier, events: &EventSink, op: F)
where
    F: Fn(Target) -> Fut,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    for target in targets {
        spawn_one(barrier, events, op(target.clone()));
    }
}

/// Spawn a single unit of work holding one barrier permit.
pub fn spawn_one<Fut>(barrier: &PhaseBarrier, events: &EventSink, work: Fut)
where
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    let permit = barrier.enter();
    let events = events.clone();
    tokio::spawn(async move {
        match work.await {
            Ok(Some(line)) => events.progress(line),
            Ok(None) => {}
            Err(error) => events.fail(error),
        }
        drop(permit);
    });
}
