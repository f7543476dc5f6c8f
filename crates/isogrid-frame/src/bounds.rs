use isogrid_camera::CameraController;
use isogrid_geom::{Bounds2, Vec2};

/// Extra world units drawn beyond the exact frustum footprint.
pub const BOUNDS_MARGIN: f32 = 2.0;
/// Bounds snap to this coarse cell so small camera jitter cannot flip
/// nodes in and out of the visible set every frame.
pub const BOUNDS_SNAP: f32 = 8.0;

/// Visible world bounds: intersect the four viewport-corner rays with the
/// ground plane, expand by the margin, and quantize outward to the coarse
/// grid. `None` when any corner ray misses the ground (camera tipped at
/// the sky), in which case the caller skips culling for the frame.
pub fn visible_bounds(cam: &mut CameraController, vw: f32, vh: f32) -> Option<Bounds2> {
    let corners = [
        (0.0, 0.0),
        (vw, 0.0),
        (0.0, vh),
        (vw, vh),
    ];
    let mut min_x = f32::INFINITY;
    let mut min_z = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_z = f32::NEG_INFINITY;
    for (sx, sy) in corners {
        let hit = cam
            .ray_at(sx, sy, vw, vh)
            .and_then(CameraController::intersect_ground)?;
        min_x = min_x.min(hit.x);
        max_x = max_x.max(hit.x);
        min_z = min_z.min(hit.z);
        max_z = max_z.max(hit.z);
    }
    let raw = Bounds2::new(Vec2::new(min_x, min_z), Vec2::new(max_x, max_z)).expanded(BOUNDS_MARGIN);
    Some(Bounds2::new(
        Vec2::new(snap_down(raw.min.x), snap_down(raw.min.y)),
        Vec2::new(snap_up(raw.max.x), snap_up(raw.max.y)),
    ))
}

#[inline]
fn snap_down(v: f32) -> f32 {
    (v / BOUNDS_SNAP).floor() * BOUNDS_SNAP
}

#[inline]
fn snap_up(v: f32) -> f32 {
    (v / BOUNDS_SNAP).ceil() * BOUNDS_SNAP
}
