//! Scheduler-agnostic domain: targets, the component graph, and phase plans.

pub mod component;
pub mod plan;
pub mod target;

pub use component::{is_scalable, Scheduler, Subsystem, PLATFORM, SCALABLE_COMPONENTS};
pub use plan::{AddonAction, Phase, Plan, Selection, Stage, Verb};
pub use target::{parse_scale_target, ScaleRequest, Target};
