//! Application services (use cases).
//!
//! The dispatcher resolves what a verb acts on, the sequencer walks the
//! resulting plan against a backend, and the aggregator renders the run's
//! events as they arrive.

pub mod aggregator;
pub mod dispatcher;
pub mod sequencer;

pub use aggregator::{aggregate, DEFAULT_INTERVAL};
pub use dispatcher::Dispatcher;
pub use sequencer::Sequencer;
