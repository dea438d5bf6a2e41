//! Infrastructure layer.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Settings loading and logging initialization

pub mod bootstrap;
pub mod config;
