//! Adapters: the CLI on the driving side, schedulers and stores on the driven side.

pub mod inbound;
pub mod outbound;
