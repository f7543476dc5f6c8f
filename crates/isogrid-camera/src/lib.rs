//! Isometric camera: orbit state with lazy matrices, ray casting, ground
//! intersection, and the memoized world-to-screen projection.
#![forbid(unsafe_code)]

mod controller;
mod projection;

pub use controller::{
    BASE_ROTATION_DEG, CAMERA_DISTANCE, CAMERA_HEIGHT, CameraController, FOV_DEFAULT_DEG,
    FOV_MAX_DEG, FOV_MIN_DEG, IsoDirection,
};
pub use projection::{ProjectionCache, ScreenPoint, world_to_screen};
