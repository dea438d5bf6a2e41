//! Outbound adapters (driven side).

pub mod fleet;
#[cfg(feature = "kubernetes")]
pub mod kubernetes;
pub mod store;
