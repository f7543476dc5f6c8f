//! Backend-independent frame planning: visible-bounds computation, node
//! filtering and budget truncation, LOD classification, and the content
//! hash that drives instance-buffer dirty tracking. The raylib backend
//! uploads whatever this crate plans.
#![forbid(unsafe_code)]

mod bounds;
mod plan;

pub use bounds::{BOUNDS_MARGIN, BOUNDS_SNAP, visible_bounds};
pub use plan::{FramePlan, LodTier, TileInstance, plan_frame};
