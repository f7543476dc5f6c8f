use hashbrown::HashMap;
use isogrid_geom::{Mat4, Vec3};

/// Pixel-space projection of a world point. `z` keeps the pre-divide
/// clip-space w, a distance-like scale factor used downstream for LOD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Points a little beyond the viewport still project (margin in NDC units)
/// so geometry straddling the edge doesn't pop.
const NDC_MARGIN: f32 = 0.15;
const BEHIND_EPS: f32 = 1e-4;
/// World-coordinate quantization for cache keys (1/16 units).
const KEY_SCALE: f32 = 16.0;

/// Project a world point through `vp` into pixels. `None` for points behind
/// the camera or outside the tolerance margin of the viewport; such points
/// are culled, not drawn.
pub fn world_to_screen(vp: &Mat4, p: Vec3, vw: f32, vh: f32) -> Option<ScreenPoint> {
    let clip = vp.transform4(p, 1.0);
    if clip.w <= BEHIND_EPS {
        return None;
    }
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let limit = 1.0 + NDC_MARGIN;
    if ndc_x < -limit || ndc_x > limit || ndc_y < -limit || ndc_y > limit {
        return None;
    }
    Some(ScreenPoint {
        x: (ndc_x + 1.0) * 0.5 * vw,
        y: (1.0 - ndc_y) * 0.5 * vh,
        z: clip.w,
    })
}

/// Memoized `world_to_screen`, keyed by a camera fingerprint plus the
/// quantized world coordinate. The hottest call in the system: one lookup
/// per visible node/connection vertex per frame, O(1) amortized. A
/// fingerprint change (camera moved) invalidates everything at once.
pub struct ProjectionCache {
    fingerprint: u64,
    map: HashMap<(i32, i32, i32), Option<ScreenPoint>>,
}

/// Fingerprint from a few matrix entries, rounded so denormal jitter does
/// not thrash the cache.
fn camera_fingerprint(vp: &Mat4, vw: f32, vh: f32) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    let mut write = |v: f32| {
        let q = (v * 1000.0).round() as i64 as u64;
        h ^= q;
        h = h.wrapping_mul(0x100000001b3);
    };
    for &i in &[0usize, 5, 10, 12, 13, 14] {
        write(vp.m[i]);
    }
    write(vw);
    write(vh);
    h
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self {
            fingerprint: 0,
            map: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn world_to_screen_cached(
        &mut self,
        vp: &Mat4,
        p: Vec3,
        vw: f32,
        vh: f32,
    ) -> Option<ScreenPoint> {
        let fp = camera_fingerprint(vp, vw, vh);
        if fp != self.fingerprint {
            self.map.clear();
            self.fingerprint = fp;
        }
        let key = (
            (p.x * KEY_SCALE).round() as i32,
            (p.y * KEY_SCALE).round() as i32,
            (p.z * KEY_SCALE).round() as i32,
        );
        if let Some(hit) = self.map.get(&key) {
            return *hit;
        }
        let computed = world_to_screen(vp, p, vw, vh);
        self.map.insert(key, computed);
        computed
    }
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self::new()
    }
}
