//! deisctl - install, start, stop and scale the Deis platform on a cluster scheduler.
//!
//! # Architecture
//!
//! Operator tokens are resolved into a phase plan, and the plan is walked
//! against a pluggable backend one barrier at a time:
//!
//! - **`application::dispatcher`** - Expands `platform`, `k8s` and `mesos`
//!   into plans, passes literal targets through, runs pre-flight checks
//! - **`application::sequencer`** - Orders phases, awaits each batch's
//!   barrier, overlaps the control plane onward on platform start
//! - **`application::aggregator`** - Renders the run's events in order and
//!   stops at the first failure
//!
//! # Modules
//!
//! - [`domain`] - Targets, the component graph and phase plans
//! - [`port`] - Backend contract, barriers, event stream, store and reporter traits
//! - [`application`] - Dispatcher, sequencer and aggregator
//! - [`adapter`] - CLI, fleet backend, Kubernetes add-ons, file store
//! - [`infrastructure`] - Settings, logging and wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `kubernetes` (default) - Cluster DNS add-on for the `k8s` scheduler
//! - `testkit` - Fake backend, in-memory store and recording reporter
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use deisctl::adapter::inbound::cli::TerminalReporter;
//! use deisctl::infrastructure::bootstrap;
//!
//! # async fn run() -> deisctl::error::Result<()> {
//! let settings = bootstrap::load_settings(None)?;
//! let dispatcher = bootstrap::build_dispatcher(&settings, Arc::new(TerminalReporter));
//! dispatcher.start(&["platform"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
