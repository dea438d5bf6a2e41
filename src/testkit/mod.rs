//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`backend`]: `FakeBackend`, a recording [`Backend`](crate::port::Backend)
//!   with per-target failures, a completion delay and optional extensions.
//! - [`store`]: `MemoryConfigStore`.
//! - [`reporter`]: `RecordingReporter`.

pub mod backend;
pub mod reporter;
pub mod store;

pub use backend::{Call, FakeBackend, FakeExtensions, Operation};
pub use reporter::RecordingReporter;
pub use store::MemoryConfigStore;
