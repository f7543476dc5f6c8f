use log::trace;

use isogrid_geom::{Bounds2, Vec2};
use isogrid_grid::{Node, parse_hex_color};
use isogrid_quality::QualitySettings;
use isogrid_spatial::{Region, SpatialIndex};

/// Detail tier for one tile, classified by distance to the camera target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodTier {
    High,
    Medium,
    Low,
}

/// One renderable tile, ready for the backend's instance batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileInstance {
    pub x: i32,
    pub y: i32,
    pub color: [u8; 4],
    pub selected: bool,
    pub lod: LodTier,
}

/// Output of one frame's planning pass. `content_hash` covers everything
/// that affects the instance batch; equal hashes mean the previous GPU
/// upload is still valid.
#[derive(Clone, Debug)]
pub struct FramePlan {
    pub bounds: Bounds2,
    pub instances: Vec<TileInstance>,
    pub content_hash: u64,
    /// Nodes dropped by the quality budget this frame.
    pub truncated: usize,
}

const FALLBACK_COLOR: [u8; 4] = [200, 200, 200, 255];

/// Plan one frame: query the spatial index for candidates inside the
/// visible bounds, keep renderable ones, truncate to the quality budget
/// (nearest to the camera target win, deterministically), classify LOD,
/// and hash the result for dirty tracking.
pub fn plan_frame(
    nodes: &[Node],
    index: &SpatialIndex,
    bounds: Bounds2,
    target: Vec2,
    selected_id: Option<&str>,
    settings: &QualitySettings,
) -> FramePlan {
    let region = Region::new(bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y);
    let mut candidates: Vec<&Node> = index
        .query(&region)
        .iter()
        .filter_map(|p| nodes.get(p.slot))
        .filter(|n| n.is_renderable())
        .collect();

    let total = candidates.len();
    let truncated = total.saturating_sub(settings.max_visible_nodes);
    if truncated > 0 {
        // Deterministic: distance first, coordinate as the tie-breaker.
        candidates.sort_by(|a, b| {
            let da = dist_sq(a, target);
            let db = dist_sq(b, target);
            da.total_cmp(&db)
                .then_with(|| (a.position.x, a.position.y).cmp(&(b.position.x, b.position.y)))
        });
        candidates.truncate(settings.max_visible_nodes);
    }

    let mut instances = Vec::with_capacity(candidates.len());
    let mut hash = Fnv::new();
    hash.write(candidates.len() as u64);
    if let Some(sel) = selected_id {
        hash.write_str(sel);
    }
    for v in [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y] {
        hash.write(v.to_bits() as u64);
    }
    for n in candidates {
        let color_src = if n.active { &n.object_color } else { &n.floor_color };
        let color = parse_hex_color(color_src).unwrap_or(FALLBACK_COLOR);
        let selected = selected_id == Some(n.id.as_str());
        let d = dist_sq(n, target).sqrt();
        let lod = if d < settings.lod_near {
            LodTier::High
        } else if d < settings.lod_far {
            LodTier::Medium
        } else {
            LodTier::Low
        };
        instances.push(TileInstance {
            x: n.position.x,
            y: n.position.y,
            color,
            selected,
            lod,
        });
        hash.write(n.position.x as u32 as u64 | ((n.position.y as u32 as u64) << 32));
        hash.write(u64::from_le_bytes([
            color[0],
            color[1],
            color[2],
            color[3],
            n.active as u8,
            selected as u8,
            0,
            0,
        ]));
    }
    trace!(
        "frame plan: {} candidates, {} instances, {} truncated",
        total,
        instances.len(),
        truncated
    );
    FramePlan {
        bounds,
        instances,
        content_hash: hash.finish(),
        truncated,
    }
}

#[inline]
fn dist_sq(n: &Node, target: Vec2) -> f32 {
    let dx = n.position.x as f32 + 0.5 - target.x;
    let dy = n.position.y as f32 + 0.5 - target.y;
    dx * dx + dy * dy
}

/// FNV-1a, the same cheap stable hash the rest of the engine uses for
/// job identity.
struct Fnv(u64);

impl Fnv {
    fn new() -> Self {
        Fnv(0xcbf29ce484222325)
    }

    #[inline]
    fn write(&mut self, v: u64) {
        self.0 ^= v;
        self.0 = self.0.wrapping_mul(0x100000001b3);
    }

    fn write_str(&mut self, s: &str) {
        for b in s.as_bytes() {
            self.write(*b as u64);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}
