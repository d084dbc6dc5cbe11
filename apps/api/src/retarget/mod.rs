// Orchestration: per-target clones, the retarget pipeline and its HTTP handlers.

pub mod clone;
pub mod handlers;
pub mod pipeline;

pub use pipeline::{retarget, retarget_many, RetargetVariant};
