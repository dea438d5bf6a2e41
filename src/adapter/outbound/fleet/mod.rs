//! Fleet backend: drives the cluster's unit scheduler through `fleetctl`.

pub mod backend;
pub mod fleetctl;
pub mod settings;
pub mod unit;

pub use backend::FleetBackend;
pub use fleetctl::Fleetctl;
pub use settings::FleetConfig;
