//! Phase sequencer: runs plans against a backend, one phase barrier at a time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::{
    is_scalable, AddonAction, Phase, Plan, ScaleRequest, Scheduler, Selection, Stage, Target, Verb,
};
use crate::error::{Error, Result};
use crate::port::{channel, Backend, EventSink, PhaseBarrier, Reporter};

use super::aggregator::{aggregate, DEFAULT_INTERVAL};

/// Orchestration engine for lifecycle verbs.
///
/// Every run opens one event stream, drains it through the aggregator and
/// closes it once the plan is done or has failed. Within a phase, batches
/// are dispatched and awaited in order; a phase only starts once the
/// previous phase's barriers have released. The one exception is a plan's
/// overlap window (platform start), where the remaining phases are
/// dispatched together and then reported in order.
pub struct Sequencer {
    backend: Arc<dyn Backend>,
    reporter: Arc<dyn Reporter>,
    interval: Duration,
}

impl Sequencer {
    pub fn new(backend: Arc<dyn Backend>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            backend,
            reporter,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Override the pause between rendered events.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    pub async fn install(&self, selection: &Selection) -> Result<()> {
        self.execute(&selection.plan(Verb::Install)).await
    }

    pub async fn start(&self, selection: &Selection) -> Result<()> {
        self.execute(&selection.plan(Verb::Start)).await
    }

    pub async fn stop(&self, selection: &Selection) -> Result<()> {
        self.execute(&selection.plan(Verb::Stop)).await
    }

    pub async fn uninstall(&self, selection: &Selection) -> Result<()> {
        self.execute(&selection.plan(Verb::Uninstall)).await
    }

    /// Stop the selection to completion, then start it.
    pub async fn restart(&self, selection: &Selection) -> Result<()> {
        self.stop(selection).await?;
        self.start(selection).await
    }

    /// Apply replica counts one request at a time.
    ///
    /// The whole call is rejected before any backend call if one of the
    /// components cannot scale.
    pub async fn scale(&self, requests: &[ScaleRequest]) -> Result<()> {
        if let Some(rejected) = requests.iter().find(|r| !is_scalable(r.component())) {
            return Err(Error::Unsupported(format!(
                "cannot scale {} components",
                rejected.component()
            )));
        }

        let span = info_span!("scale", run_id = %Uuid::new_v4(), requests = requests.len());
        self.run(None, |events| async move {
            for request in requests {
                if events.is_aborted() {
                    break;
                }
                debug!(component = request.component(), replicas = request.replicas(), "Scaling");
                let barrier = PhaseBarrier::new();
                self.backend
                    .scale(request.component(), request.replicas(), &barrier, &events);
                if !settle(barrier, &events).await {
                    break;
                }
            }
        })
        .instrument(span)
        .await
    }

    /// Print each target's status, stopping at the first error.
    pub async fn status(&self, targets: &[Target]) -> Result<()> {
        for target in targets {
            self.backend.status(target).await?;
        }
        Ok(())
    }

    /// Print each target's journal, stopping at the first error.
    pub async fn journal(&self, targets: &[Target]) -> Result<()> {
        for target in targets {
            self.backend.journal(target).await?;
        }
        Ok(())
    }

    /// Run a plan to completion or first failure.
    pub async fn execute(&self, plan: &Plan) -> Result<()> {
        let span = info_span!("run", run_id = %Uuid::new_v4(), verb = %plan.verb());
        async {
            info!(
                backend = self.backend.name(),
                stages = plan.stages().len(),
                targets = plan.members().len(),
                "Run starting"
            );
            let outcome = self
                .run(plan.title(), |events| self.walk(plan, events))
                .await;
            match &outcome {
                Ok(()) => {
                    info!("Run complete");
                    if plan.title().is_some() {
                        self.reporter.finished(plan.hints());
                    }
                }
                Err(error) => warn!(error = %error, "Run failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Own one event stream for the duration of `body`.
    async fn run<F, Fut>(&self, title: Option<&str>, body: F) -> Result<()>
    where
        F: FnOnce(EventSink) -> Fut,
        Fut: Future<Output = ()>,
    {
        let (events, stream) = channel();
        let printer = tokio::spawn(aggregate(stream, Arc::clone(&self.reporter), self.interval));

        if let Some(title) = title {
            events.heading(title);
        }
        body(events.clone()).await;
        events.close();

        printer.await??;
        if events.is_aborted() {
            return Err(Error::Aborted);
        }
        Ok(())
    }

    async fn walk(&self, plan: &Plan, events: EventSink) {
        let stages = plan.stages();
        let mut index = 0;

        while index < stages.len() {
            if events.is_aborted() {
                return;
            }

            if plan.overlap_from() == Some(index) {
                let phases: Vec<&Phase> = stages[index..]
                    .iter()
                    .map_while(|stage| match stage {
                        Stage::Phase(phase) => Some(phase),
                        Stage::Addon { .. } => None,
                    })
                    .collect();
                if !self.overlap(plan.verb(), &phases, &events).await {
                    return;
                }
                index += phases.len().max(1);
                continue;
            }

            let completed = match &stages[index] {
                Stage::Phase(phase) => self.phase(plan.verb(), phase, &events).await,
                Stage::Addon {
                    heading,
                    scheduler,
                    action,
                } => self.addon(heading, *scheduler, *action, &events).await,
            };
            if !completed {
                return;
            }
            index += 1;
        }
    }

    async fn phase(&self, verb: Verb, phase: &Phase, events: &EventSink) -> bool {
        if let Some(heading) = phase.heading() {
            events.heading(heading);
        }
        for batch in phase.batches() {
            let barrier = PhaseBarrier::new();
            self.issue(verb, batch, &barrier, events);
            if !settle(barrier, events).await {
                return false;
            }
        }
        true
    }

    /// Dispatch every batch of `phases` at once, then report them in order.
    async fn overlap(&self, verb: Verb, phases: &[&Phase], events: &EventSink) -> bool {
        let dispatched: Vec<(Option<&str>, Vec<PhaseBarrier>)> = phases
            .iter()
            .map(|phase| {
                let barriers = phase
                    .batches()
                    .iter()
                    .map(|batch| {
                        let barrier = PhaseBarrier::new();
                        self.issue(verb, batch, &barrier, events);
                        barrier
                    })
                    .collect();
                (phase.heading(), barriers)
            })
            .collect();
        debug!(phases = dispatched.len(), "Overlapped phases dispatched");

        for (heading, barriers) in dispatched {
            if events.is_aborted() {
                return false;
            }
            if let Some(heading) = heading {
                events.heading(heading);
            }
            for barrier in barriers {
                if !settle(barrier, events).await {
                    return false;
                }
            }
        }
        true
    }

    async fn addon(
        &self,
        heading: &str,
        scheduler: Scheduler,
        action: AddonAction,
        events: &EventSink,
    ) -> bool {
        events.heading(heading);
        let Some(extensions) = self.backend.extensions() else {
            warn!(
                backend = self.backend.name(),
                scheduler = scheduler.name(),
                "Backend has no extensions, skipping add-ons"
            );
            events.warn(format!(
                "{} backend cannot manage {} add-ons, skipping",
                self.backend.name(),
                scheduler.display_name()
            ));
            return true;
        };

        let barrier = PhaseBarrier::new();
        match action {
            AddonAction::Bootstrap => extensions.bootstrap(scheduler, &barrier, events),
            AddonAction::Teardown => extensions.teardown(scheduler, &barrier, events),
        }
        settle(barrier, events).await
    }

    fn issue(&self, verb: Verb, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        debug!(%verb, targets = targets.len(), "Dispatching batch");
        match verb {
            Verb::Install => self.backend.create(targets, barrier, events),
            Verb::Start => self.backend.start(targets, barrier, events),
            Verb::Stop => self.backend.stop(targets, barrier, events),
            Verb::Uninstall => self.backend.destroy(targets, barrier, events),
        }
    }

    /// Enumerate installed units.
    pub async fn list_units(&self) -> Result<()> {
        self.backend.list_units().await
    }

    /// Print the defined unit files.
    pub async fn list_unit_files(&self) -> Result<()> {
        self.backend.list_unit_files().await
    }
}

/// Wait for `barrier` unless the run fails first.
///
/// Returns whether the run may advance. Operations still in flight after a
/// failure are left running; they are just no longer awaited.
async fn settle(barrier: PhaseBarrier, events: &EventSink) -> bool {
    tokio::select! {
        biased;
        () = events.aborted() => false,
        () = barrier.wait() => !events.is_aborted(),
    }
}
