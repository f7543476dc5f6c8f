use isogrid_geom::{Mat4, Ray, Vec2, Vec3};

/// Fixed camera elevation above the ground plane.
pub const CAMERA_HEIGHT: f32 = 60.0;
/// Fixed horizontal distance from the target; together with the elevation
/// this produces the isometric look.
pub const CAMERA_DISTANCE: f32 = 60.0;
/// Rotation at which "screen up" aligns with the default view.
pub const BASE_ROTATION_DEG: f32 = 45.0;
/// FOV clamp range; the UI presents this as a 200-325% zoom label
/// (`zoom_percent = fov_deg * 10`).
pub const FOV_MIN_DEG: f32 = 20.0;
pub const FOV_MAX_DEG: f32 = 32.5;
pub const FOV_DEFAULT_DEG: f32 = 27.5;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 10_000.0;
const PLANE_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IsoDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Isometric orbit camera. All mutators mark the matrices dirty; they are
/// recomputed lazily on the next read.
pub struct CameraController {
    target: Vec2,
    rotation_deg: f32,
    fov_deg: f32,
    aspect: f32,
    dirty: bool,
    view_projection: Mat4,
    inverse_view_projection: Option<Mat4>,
}

fn wrap_degrees(deg: f32) -> f32 {
    let r = deg % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

impl CameraController {
    pub fn new(aspect: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            rotation_deg: BASE_ROTATION_DEG,
            fov_deg: FOV_DEFAULT_DEG,
            aspect,
            dirty: true,
            view_projection: Mat4::IDENTITY,
            inverse_view_projection: None,
        }
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    #[inline]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Zoom as the UI label percentage (200-325).
    #[inline]
    pub fn zoom_percent(&self) -> f32 {
        self.fov_deg * 10.0
    }

    pub fn set_target(&mut self, x: f32, z: f32) {
        self.target = Vec2::new(x, z);
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, deg: f32) {
        self.rotation_deg = wrap_degrees(deg);
        self.dirty = true;
    }

    pub fn set_fov(&mut self, deg: f32) {
        self.fov_deg = deg.clamp(FOV_MIN_DEG, FOV_MAX_DEG);
        self.dirty = true;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.dirty = true;
    }

    /// Reset target/rotation/FOV to the defaults centered on `(cx, cz)`.
    /// Used on view reset and grid re-initialization.
    pub fn set_isometric(&mut self, cx: f32, cz: f32, rotation_deg: f32) {
        self.target = Vec2::new(cx, cz);
        self.rotation_deg = wrap_degrees(rotation_deg);
        self.fov_deg = FOV_DEFAULT_DEG;
        self.dirty = true;
    }

    /// World-space camera position derived from target/rotation.
    pub fn position(&self) -> Vec3 {
        let r = self.rotation_deg.to_radians();
        Vec3::new(
            self.target.x + CAMERA_DISTANCE * r.cos(),
            CAMERA_HEIGHT,
            self.target.y + CAMERA_DISTANCE * r.sin(),
        )
    }

    fn rebuild(&mut self) {
        let eye = self.position();
        let target = Vec3::new(self.target.x, 0.0, self.target.y);
        let view = Mat4::look_at(eye, target, Vec3::UP);
        let proj = Mat4::perspective(
            self.fov_deg.to_radians(),
            self.aspect.max(1e-3),
            NEAR_PLANE,
            FAR_PLANE,
        );
        self.view_projection = proj.mul(&view);
        self.inverse_view_projection = self.view_projection.inverse();
        self.dirty = false;
    }

    /// Combined perspective x look-at matrix, recomputed only when dirty.
    pub fn view_projection(&mut self) -> Mat4 {
        if self.dirty {
            self.rebuild();
        }
        self.view_projection
    }

    pub fn inverse_view_projection(&mut self) -> Option<Mat4> {
        if self.dirty {
            self.rebuild();
        }
        self.inverse_view_projection
    }

    /// Unproject a screen position through the two NDC depth extremes and
    /// return the world-space ray between them.
    pub fn ray_at(&mut self, screen_x: f32, screen_y: f32, vw: f32, vh: f32) -> Option<Ray> {
        if vw <= 0.0 || vh <= 0.0 {
            return None;
        }
        let inv = self.inverse_view_projection()?;
        let ndc_x = (screen_x / vw) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen_y / vh) * 2.0;
        let near = inv.transform4(Vec3::new(ndc_x, ndc_y, -1.0), 1.0);
        let far = inv.transform4(Vec3::new(ndc_x, ndc_y, 1.0), 1.0);
        if near.w.abs() < PLANE_EPS || far.w.abs() < PLANE_EPS {
            return None;
        }
        let origin = Vec3::new(near.x / near.w, near.y / near.w, near.z / near.w);
        let tip = Vec3::new(far.x / far.w, far.y / far.w, far.z / far.w);
        let dir = (tip - origin).normalized();
        if dir.length() == 0.0 {
            return None;
        }
        Some(Ray::new(origin, dir))
    }

    /// Ray vs the ground plane (y = 0). `None` when the ray runs
    /// (near-)parallel to the plane or points away from it.
    pub fn intersect_ground(ray: Ray) -> Option<Vec3> {
        if ray.dir.y.abs() < PLANE_EPS {
            return None;
        }
        let t = -ray.origin.y / ray.dir.y;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }

    /// Convert a screen-space drag into a world-space translation by
    /// diffing the ground intersections under the viewport center and the
    /// offset point. Panning speed stays consistent across zoom and tilt.
    pub fn pan_screen(&mut self, dx: f32, dy: f32, vw: f32, vh: f32) {
        let cx = vw * 0.5;
        let cy = vh * 0.5;
        let Some(center) = self
            .ray_at(cx, cy, vw, vh)
            .and_then(Self::intersect_ground)
        else {
            return;
        };
        let Some(offset) = self
            .ray_at(cx + dx, cy + dy, vw, vh)
            .and_then(Self::intersect_ground)
        else {
            return;
        };
        // Dragging pulls the world with the cursor: move the target the
        // opposite way of the ground-point delta.
        let shift = center - offset;
        self.set_target(self.target.x + shift.x, self.target.y + shift.z);
    }

    /// Move the target so that the cardinal directions track the screen,
    /// not the world: "up" is always toward the top of the screen, whatever
    /// the current rotation.
    pub fn move_isometric(&mut self, dir: IsoDirection, speed: f32) {
        let r = self.rotation_deg.to_radians();
        // Ground-plane forward vector from camera toward target.
        let up = Vec2::new(-r.cos(), -r.sin());
        let right = Vec2::new(-up.y, up.x);
        let v = match dir {
            IsoDirection::Up => up,
            IsoDirection::Down => up * -1.0,
            IsoDirection::Right => right,
            IsoDirection::Left => right * -1.0,
        };
        self.set_target(self.target.x + v.x * speed, self.target.y + v.y * speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_into_range() {
        let mut cam = CameraController::new(1.6);
        cam.set_rotation(-90.0);
        assert_eq!(cam.rotation_deg(), 270.0);
        cam.set_rotation(725.0);
        assert!((cam.rotation_deg() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn fov_is_clamped() {
        let mut cam = CameraController::new(1.6);
        cam.set_fov(5.0);
        assert_eq!(cam.fov_deg(), FOV_MIN_DEG);
        cam.set_fov(90.0);
        assert_eq!(cam.fov_deg(), FOV_MAX_DEG);
        assert!((cam.zoom_percent() - 325.0).abs() < 1e-3);
    }

    #[test]
    fn ground_ray_from_viewport_center_hits_near_target() {
        let mut cam = CameraController::new(16.0 / 9.0);
        cam.set_target(12.0, -7.0);
        let ray = cam.ray_at(640.0, 360.0, 1280.0, 720.0).unwrap();
        let hit = CameraController::intersect_ground(ray).unwrap();
        assert!((hit.x - 12.0).abs() < 0.5);
        assert!((hit.z + 7.0).abs() < 0.5);
        assert!(hit.y.abs() < 1e-3);
    }

    #[test]
    fn upward_ray_misses_ground() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(CameraController::intersect_ground(ray).is_none());
        let level = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(CameraController::intersect_ground(level).is_none());
    }

    #[test]
    fn move_isometric_up_approaches_camera_forward() {
        let mut cam = CameraController::new(1.6);
        cam.set_isometric(0.0, 0.0, 0.0);
        // Rotation 0: camera sits at +x, so forward (screen up) is -x.
        cam.move_isometric(IsoDirection::Up, 2.0);
        let t = cam.target();
        assert!((t.x + 2.0).abs() < 1e-4);
        assert!(t.y.abs() < 1e-4);
    }
}
