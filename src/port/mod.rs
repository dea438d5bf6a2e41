//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │       Application        │
//!                 │  dispatcher → sequencer  │
//!                 │        → aggregator      │
//!                 └────────────┬─────────────┘
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌─────────────┐     ┌────────────┐
//!    │  Backend  │      │ ConfigStore │     │  Reporter  │
//!    │ (fleet …) │      │   (file …)  │     │ (terminal) │
//!    └───────────┘      └─────────────┘     └────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Backend`], [`Extensions`] - Scheduler integration, with [`PhaseBarrier`]
//!   and [`EventSink`] as the completion and reporting channels
//! - [`ConfigStore`] - Cluster-wide configuration keys
//! - [`Reporter`] - Operator-visible output

mod backend;
mod barrier;
mod events;
mod reporter;
mod store;

pub use backend::{dispatch, spawn_one, Backend, Extensions};
pub use barrier::{PhaseBarrier, Permit};
pub use events::{channel, Event, EventSink, EventStream};
pub use reporter::Reporter;
pub use store::{component_key, ConfigStore, KEY_ROOT};
