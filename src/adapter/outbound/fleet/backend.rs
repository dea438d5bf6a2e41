//! [`Backend`] over a fleet cluster.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::Target;
use crate::error::{BackendError, Result};
use crate::port::{dispatch, spawn_one, Backend, EventSink, Extensions, PhaseBarrier};

use super::fleetctl::Fleetctl;
use super::settings::FleetConfig;
use super::unit::{find_template, instance_index, stage, unit_name};

struct Units {
    fleetctl: Fleetctl,
    search_path: Vec<PathBuf>,
    staging: PathBuf,
}

impl Units {
    async fn create(&self, target: &Target) -> Result<String> {
        let unit = unit_name(target);
        let template = find_template(&self.search_path, target.name())?;
        let path = if target.index().is_some() {
            stage(&template, &self.staging, &unit).await?
        } else {
            template
        };
        let path = path.to_string_lossy().into_owned();
        self.fleetctl.output(&unit, &["load", path.as_str()]).await?;
        Ok(format!("{unit}: loaded"))
    }

    async fn start(&self, target: &Target) -> Result<String> {
        let unit = unit_name(target);
        self.fleetctl.output(&unit, &["start", &unit]).await?;
        Ok(format!("{unit}: running"))
    }

    async fn stop(&self, target: &Target) -> Result<String> {
        let unit = unit_name(target);
        self.fleetctl.output(&unit, &["stop", &unit]).await?;
        Ok(format!("{unit}: inactive"))
    }

    async fn destroy(&self, target: &Target) -> Result<String> {
        let unit = unit_name(target);
        self.fleetctl.output(&unit, &["destroy", &unit]).await?;
        Ok(format!("{unit}: destroyed"))
    }

    /// Instance indices of `component` currently known to fleet.
    async fn instances(&self, component: &str) -> Result<BTreeSet<u32>> {
        let listing = self
            .fleetctl
            .output(component, &["list-units", "--no-legend", "--full", "--fields=unit"])
            .await?;
        Ok(listing
            .lines()
            .filter_map(|line| instance_index(line.trim(), component))
            .collect())
    }

    /// Converge `component@1..=replicas`: add missing instances, remove the rest.
    async fn scale(&self, component: &str, replicas: u64) -> Result<String> {
        let wanted = u32::try_from(replicas)
            .map_err(|_| BackendError::new(component, format!("cannot run {replicas} instances")))?;
        let current = self.instances(component).await?;
        debug!(component, wanted, current = current.len(), "Reconciling instances");

        for index in (1..=wanted).filter(|i| !current.contains(i)) {
            let target = Target::indexed(component, index);
            self.create(&target).await?;
            self.start(&target).await?;
        }
        for index in current.iter().copied().filter(|i| *i > wanted).rev() {
            let target = Target::indexed(component, index);
            self.stop(&target).await?;
            self.destroy(&target).await?;
        }
        Ok(format!("{component}: scaled to {replicas}"))
    }
}

/// Schedules Deis units on fleet by driving `fleetctl`.
///
/// Every lifecycle operation runs one task per target. Scheduler add-ons
/// are delegated to an attached [`Extensions`] implementation, if any.
#[derive(Clone)]
pub struct FleetBackend {
    units: Arc<Units>,
    extensions: Option<Arc<dyn Extensions>>,
}

impl FleetBackend {
    pub fn new(config: &FleetConfig) -> Self {
        Self {
            units: Arc::new(Units {
                fleetctl: Fleetctl::new(config),
                search_path: config.search_path(),
                staging: std::env::temp_dir().join("deisctl-units"),
            }),
            extensions: None,
        }
    }

    /// Attach scheduler add-on support.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Arc<dyn Extensions>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Directories unit files are looked up in.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.units.search_path
    }
}

#[async_trait]
impl Backend for FleetBackend {
    fn create(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        dispatch(targets, barrier, events, |target| {
            let units = Arc::clone(&self.units);
            async move { units.create(&target).await.map(Some) }
        });
    }

    fn start(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        dispatch(targets, barrier, events, |target| {
            let units = Arc::clone(&self.units);
            async move { units.start(&target).await.map(Some) }
        });
    }

    fn stop(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        dispatch(targets, barrier, events, |target| {
            let units = Arc::clone(&self.units);
            async move { units.stop(&target).await.map(Some) }
        });
    }

    fn destroy(&self, targets: &[Target], barrier: &PhaseBarrier, events: &EventSink) {
        dispatch(targets, barrier, events, |target| {
            let units = Arc::clone(&self.units);
            async move { units.destroy(&target).await.map(Some) }
        });
    }

    fn scale(&self, component: &str, replicas: u64, barrier: &PhaseBarrier, events: &EventSink) {
        info!(component, replicas, "Scaling");
        let units = Arc::clone(&self.units);
        let component = component.to_string();
        spawn_one(barrier, events, async move {
            units.scale(&component, replicas).await.map(Some)
        });
    }

    async fn status(&self, target: &Target) -> Result<()> {
        let unit = unit_name(target);
        self.units.fleetctl.interactive(&unit, &["status", &unit]).await
    }

    async fn journal(&self, target: &Target) -> Result<()> {
        let unit = unit_name(target);
        self.units.fleetctl.interactive(&unit, &["journal", &unit]).await
    }

    async fn list_units(&self) -> Result<()> {
        self.units.fleetctl.interactive("fleet", &["list-units"]).await
    }

    async fn list_unit_files(&self) -> Result<()> {
        self.units
            .fleetctl
            .interactive("fleet", &["list-unit-files"])
            .await
    }

    fn extensions(&self) -> Option<&dyn Extensions> {
        self.extensions.as_deref()
    }

    fn name(&self) -> &'static str {
        "fleet"
    }
}
