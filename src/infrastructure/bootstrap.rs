//! Composition root: settings in, a ready [`Dispatcher`] out.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapter::inbound::cli::paths;
use crate::adapter::outbound::fleet::FleetBackend;
#[cfg(feature = "kubernetes")]
use crate::adapter::outbound::kubernetes::KubeDnsAddon;
use crate::adapter::outbound::store::FileConfigStore;
use crate::application::{Dispatcher, Sequencer};
use crate::error::Result;
use crate::infrastructure::config::Settings;
use crate::port::{Backend, ConfigStore, Reporter};

/// Load settings from an explicit path, or from `~/.deisctl/config.toml` if present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Settings::load_or_default(paths::default_config()),
    }
}

/// Wire the store, backend and sequencer behind a dispatcher.
pub fn build_dispatcher(settings: &Settings, reporter: Arc<dyn Reporter>) -> Dispatcher {
    let store_path = settings
        .store
        .path
        .clone()
        .unwrap_or_else(paths::default_store);
    debug!(path = %store_path.display(), "Using configuration store");
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::new(store_path));

    let backend = build_backend(settings, Arc::clone(&store));
    info!(backend = backend.name(), "Backend ready");

    let sequencer = Sequencer::new(backend, reporter).with_interval(settings.output.interval());
    Dispatcher::new(sequencer, store)
}

#[cfg(feature = "kubernetes")]
fn build_backend(settings: &Settings, store: Arc<dyn ConfigStore>) -> Arc<dyn Backend> {
    let dns = KubeDnsAddon::new(store, &settings.kubernetes);
    Arc::new(FleetBackend::new(&settings.fleet).with_extensions(Arc::new(dns)))
}

#[cfg(not(feature = "kubernetes"))]
fn build_backend(settings: &Settings, _store: Arc<dyn ConfigStore>) -> Arc<dyn Backend> {
    Arc::new(FleetBackend::new(&settings.fleet))
}
