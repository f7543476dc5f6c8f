//! Raylib-based GPU rendering: conversions, tile batch upload, ground and
//! tile shaders, connection polylines.
// Unsafe is required for Raylib mesh/model upload operations in this crate.

use isogrid_camera::{CAMERA_HEIGHT, CameraController};
use isogrid_frame::{FramePlan, LodTier, TileInstance};
use isogrid_grid::GridCoordinate;
use log::{debug, warn};
use raylib::prelude::*;

pub mod conv {
    use isogrid_geom::{Vec2, Vec3};

    pub fn vec3_to_rl(v: Vec3) -> raylib::prelude::Vector3 {
        raylib::prelude::Vector3::new(v.x, v.y, v.z)
    }

    pub fn vec3_from_rl(v: raylib::prelude::Vector3) -> Vec3 {
        Vec3 {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    /// Grid-plane point to a world position on the ground.
    pub fn ground_to_rl(p: Vec2, lift: f32) -> raylib::prelude::Vector3 {
        raylib::prelude::Vector3::new(p.x, lift, p.y)
    }

    pub fn rgba_to_rl(c: [u8; 4]) -> raylib::prelude::Color {
        raylib::prelude::Color::new(c[0], c[1], c[2], c[3])
    }
}

/// Build a raylib camera from the isometric controller. The controller owns
/// the projection math; this is only for raylib's 3D mode block, which wants
/// position/target/fovy in its own types.
pub fn to_camera3d(cam: &CameraController) -> Camera3D {
    let pos = cam.position();
    let t = cam.target();
    Camera3D::perspective(
        conv::vec3_to_rl(pos),
        Vector3::new(t.x, 0.0, t.y),
        Vector3::new(0.0, 1.0, 0.0),
        cam.fov_deg(),
    )
}

/// Tiles float just above the ground quad so they never z-fight with it.
pub const TILE_LIFT: f32 = 0.02;
/// Selection borders sit above the tile fill.
pub const BORDER_LIFT: f32 = 0.03;
const BORDER_THICKNESS: f32 = 0.08;
const BORDER_COLOR: [u8; 4] = [255, 214, 64, 255];

/// CPU-side vertex buffers for one tile batch, quad soup in the layout the
/// upload path expects (4 verts per quad, two triangles each).
#[derive(Default)]
pub struct TileBatchCpu {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub col: Vec<u8>,
}

impl TileBatchCpu {
    pub fn quad_count(&self) -> usize {
        self.pos.len() / 12
    }

    fn push_quad(&mut self, x0: f32, z0: f32, x1: f32, z1: f32, y: f32, lod: f32, c: [u8; 4]) {
        let corners = [(x0, z0), (x1, z0), (x1, z1), (x0, z1)];
        let uvs = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for ((cx, cz), (u, v)) in corners.into_iter().zip(uvs) {
            self.pos.extend_from_slice(&[cx, y, cz]);
            // normal.y is always up; normal.x smuggles the LOD tier to the
            // fragment shader so low tiers can skip edge detailing.
            self.norm.extend_from_slice(&[lod, 1.0, 0.0]);
            self.uv.extend_from_slice(&[u, v]);
            self.col.extend_from_slice(&c);
        }
    }
}

fn lod_weight(lod: LodTier) -> f32 {
    match lod {
        LodTier::High => 0.0,
        LodTier::Medium => 1.0,
        LodTier::Low => 2.0,
    }
}

/// Flatten a frame plan into quad-soup buffers. Selected tiles get four
/// extra border quads drawn slightly above the fill.
pub fn build_tile_batch(plan: &FramePlan) -> TileBatchCpu {
    let mut cpu = TileBatchCpu::default();
    for inst in &plan.instances {
        let TileInstance {
            x, y, color, lod, ..
        } = *inst;
        let (x0, z0) = (x as f32, y as f32);
        let (x1, z1) = (x0 + 1.0, z0 + 1.0);
        cpu.push_quad(x0, z0, x1, z1, TILE_LIFT, lod_weight(lod), color);
        if inst.selected {
            let t = BORDER_THICKNESS;
            cpu.push_quad(x0, z0, x1, z0 + t, BORDER_LIFT, 0.0, BORDER_COLOR);
            cpu.push_quad(x0, z1 - t, x1, z1, BORDER_LIFT, 0.0, BORDER_COLOR);
            cpu.push_quad(x0, z0 + t, x0 + t, z1 - t, BORDER_LIFT, 0.0, BORDER_COLOR);
            cpu.push_quad(x1 - t, z0 + t, x1, z1 - t, BORDER_LIFT, 0.0, BORDER_COLOR);
        }
    }
    cpu
}

pub struct TileBatchRender {
    pub model: raylib::core::models::Model,
    pub content_hash: u64,
    pub quad_count: usize,
}

/// Largest quad count addressable with 16-bit mesh indices.
pub const MAX_BATCH_QUADS: usize = u16::MAX as usize / 4;

/// Upload a planned tile batch to the GPU. Returns None for an empty plan
/// or if model creation fails; callers keep the previous batch in that
/// case. Quads past the 16-bit index range are dropped; the quality
/// budget keeps real plans well under it.
pub fn upload_tile_batch(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    plan: &FramePlan,
) -> Option<TileBatchRender> {
    let cpu = build_tile_batch(plan);
    let total = cpu.quad_count();
    let quads = total.min(MAX_BATCH_QUADS);
    if quads < total {
        warn!("tile batch overflows 16-bit indices; dropping {} quads", total - quads);
    }
    if quads == 0 {
        return None;
    }
    let v_count = quads * 4;
    let mut raw: raylib::ffi::Mesh = unsafe { std::mem::zeroed() };
    raw.vertexCount = v_count as i32;
    raw.triangleCount = (quads * 2) as i32;
    unsafe {
        let vbytes = (v_count * 3 * std::mem::size_of::<f32>()) as u32;
        let tbytes = (v_count * 2 * std::mem::size_of::<f32>()) as u32;
        let cbytes = (v_count * 4 * std::mem::size_of::<u8>()) as u32;
        let ibytes = (quads * 6 * std::mem::size_of::<u16>()) as u32;
        raw.vertices = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        raw.normals = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        raw.texcoords = raylib::ffi::MemAlloc(tbytes) as *mut f32;
        raw.colors = raylib::ffi::MemAlloc(cbytes) as *mut u8;
        raw.indices = raylib::ffi::MemAlloc(ibytes) as *mut u16;
        std::ptr::copy_nonoverlapping(cpu.pos.as_ptr(), raw.vertices, v_count * 3);
        std::ptr::copy_nonoverlapping(cpu.norm.as_ptr(), raw.normals, v_count * 3);
        std::ptr::copy_nonoverlapping(cpu.uv.as_ptr(), raw.texcoords, v_count * 2);
        std::ptr::copy_nonoverlapping(cpu.col.as_ptr(), raw.colors, v_count * 4);
        let idx_ptr = raw.indices;
        let mut write = 0usize;
        for i in 0..quads {
            let base = (i * 4) as u16;
            let tri = [base, base + 1, base + 2, base, base + 2, base + 3];
            let dst = idx_ptr.add(write);
            std::ptr::copy_nonoverlapping(tri.as_ptr(), dst, 6);
            write += 6;
        }
    }
    let mut mesh = unsafe { raylib::core::models::Mesh::from_raw(raw) };
    unsafe {
        mesh.upload(false);
    }
    let model = rl
        .load_model_from_mesh(thread, unsafe { mesh.make_weak() })
        .ok()?;
    debug!("uploaded tile batch: {} quads", quads);
    Some(TileBatchRender {
        model,
        content_hash: plan.content_hash,
        quad_count: quads,
    })
}

/// Single ground quad covering the grid plus a skirt, textured by the grid
/// shader. UVs are in tile units so the shader draws one line per tile.
pub fn upload_ground(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    width: i32,
    height: i32,
) -> Option<raylib::core::models::Model> {
    const SKIRT: f32 = 64.0;
    let (x0, z0) = (-SKIRT, -SKIRT);
    let (x1, z1) = (width as f32 + SKIRT, height as f32 + SKIRT);
    let mut raw: raylib::ffi::Mesh = unsafe { std::mem::zeroed() };
    raw.vertexCount = 4;
    raw.triangleCount = 2;
    unsafe {
        raw.vertices = raylib::ffi::MemAlloc((12 * std::mem::size_of::<f32>()) as u32) as *mut f32;
        raw.normals = raylib::ffi::MemAlloc((12 * std::mem::size_of::<f32>()) as u32) as *mut f32;
        raw.texcoords = raylib::ffi::MemAlloc((8 * std::mem::size_of::<f32>()) as u32) as *mut f32;
        raw.indices = raylib::ffi::MemAlloc((6 * std::mem::size_of::<u16>()) as u32) as *mut u16;
        let pos: [f32; 12] = [x0, 0.0, z0, x1, 0.0, z0, x1, 0.0, z1, x0, 0.0, z1];
        let norm: [f32; 12] = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let uv: [f32; 8] = [x0, z0, x1, z0, x1, z1, x0, z1];
        let idx: [u16; 6] = [0, 1, 2, 0, 2, 3];
        std::ptr::copy_nonoverlapping(pos.as_ptr(), raw.vertices, 12);
        std::ptr::copy_nonoverlapping(norm.as_ptr(), raw.normals, 12);
        std::ptr::copy_nonoverlapping(uv.as_ptr(), raw.texcoords, 8);
        std::ptr::copy_nonoverlapping(idx.as_ptr(), raw.indices, 6);
    }
    let mut mesh = unsafe { raylib::core::models::Mesh::from_raw(raw) };
    unsafe {
        mesh.upload(false);
    }
    rl.load_model_from_mesh(thread, unsafe { mesh.make_weak() }).ok()
}

pub struct GroundShader {
    pub shader: raylib::shaders::WeakShader,
    pub loc_base_color: i32,
    pub loc_line_color: i32,
    pub loc_grid_extent: i32,
    pub loc_fade_dist: i32,
    pub loc_camera_pos: i32,
}

impl GroundShader {
    pub fn load(rl: &mut RaylibHandle, thread: &RaylibThread) -> Option<Self> {
        Self::load_from(rl, thread, "assets/shaders/ground_grid.vs", "assets/shaders/ground_grid.fs")
    }

    pub fn load_with_base(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        base: &std::path::Path,
    ) -> Option<Self> {
        let vs = base.join("assets/shaders/ground_grid.vs");
        let fs = base.join("assets/shaders/ground_grid.fs");
        Self::load_from(
            rl,
            thread,
            vs.to_string_lossy().as_ref(),
            fs.to_string_lossy().as_ref(),
        )
    }

    fn load_from(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        vs: &str,
        fs: &str,
    ) -> Option<Self> {
        let shader_strong = rl.load_shader(thread, Some(vs), Some(fs));
        let shader = unsafe { shader_strong.make_weak() };
        let loc_base_color = shader.get_shader_location("baseColor");
        let loc_line_color = shader.get_shader_location("lineColor");
        let loc_grid_extent = shader.get_shader_location("gridExtent");
        let loc_fade_dist = shader.get_shader_location("fadeDist");
        let loc_camera_pos = shader.get_shader_location("cameraPos");
        let mut s = Self {
            shader,
            loc_base_color,
            loc_line_color,
            loc_grid_extent,
            loc_fade_dist,
            loc_camera_pos,
        };
        s.set_colors([0.93, 0.93, 0.95], [0.78, 0.78, 0.82]);
        Some(s)
    }

    pub fn set_colors(&mut self, base: [f32; 3], line: [f32; 3]) {
        if self.loc_base_color >= 0 {
            self.shader.set_shader_value(self.loc_base_color, base);
        }
        if self.loc_line_color >= 0 {
            self.shader.set_shader_value(self.loc_line_color, line);
        }
    }

    pub fn set_grid_extent(&mut self, width: f32, height: f32) {
        if self.loc_grid_extent >= 0 {
            self.shader
                .set_shader_value(self.loc_grid_extent, [width, height]);
        }
    }

    pub fn update_frame_uniforms(&mut self, camera_pos: Vector3) {
        if self.loc_camera_pos >= 0 {
            let cam = [camera_pos.x, camera_pos.y, camera_pos.z];
            self.shader.set_shader_value(self.loc_camera_pos, cam);
        }
        if self.loc_fade_dist >= 0 {
            self.shader
                .set_shader_value(self.loc_fade_dist, CAMERA_HEIGHT * 4.0);
        }
    }
}

pub struct TileShader {
    pub shader: raylib::shaders::WeakShader,
    pub loc_edge_color: i32,
    pub loc_textured: i32,
}

impl TileShader {
    pub fn load(rl: &mut RaylibHandle, thread: &RaylibThread) -> Option<Self> {
        Self::load_from(rl, thread, "assets/shaders/tile.vs", "assets/shaders/tile.fs")
    }

    pub fn load_with_base(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        base: &std::path::Path,
    ) -> Option<Self> {
        let vs = base.join("assets/shaders/tile.vs");
        let fs = base.join("assets/shaders/tile.fs");
        Self::load_from(
            rl,
            thread,
            vs.to_string_lossy().as_ref(),
            fs.to_string_lossy().as_ref(),
        )
    }

    fn load_from(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        vs: &str,
        fs: &str,
    ) -> Option<Self> {
        let shader_strong = rl.load_shader(thread, Some(vs), Some(fs));
        let shader = unsafe { shader_strong.make_weak() };
        let loc_edge_color = shader.get_shader_location("edgeColor");
        let loc_textured = shader.get_shader_location("texturesEnabled");
        let mut s = Self {
            shader,
            loc_edge_color,
            loc_textured,
        };
        s.set_edge_color([0.12, 0.12, 0.16]);
        Some(s)
    }

    pub fn set_edge_color(&mut self, c: [f32; 3]) {
        if self.loc_edge_color >= 0 {
            self.shader.set_shader_value(self.loc_edge_color, c);
        }
    }

    pub fn update_frame_uniforms(&mut self, textures_enabled: bool) {
        if self.loc_textured >= 0 {
            let v: i32 = if textures_enabled { 1 } else { 0 };
            self.shader.set_shader_value(self.loc_textured, v);
        }
    }
}

/// Expand a grid-cell path into world-space polyline points at cell
/// centers, lifted above the tile fill.
pub fn path_to_world(path: &[GridCoordinate], lift: f32) -> Vec<Vector3> {
    path.iter()
        .map(|c| Vector3::new(c.x as f32 + 0.5, lift, c.y as f32 + 0.5))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use isogrid_geom::{Bounds2, Vec2};

    fn plan_of(instances: Vec<TileInstance>) -> FramePlan {
        FramePlan {
            bounds: Bounds2::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)),
            instances,
            content_hash: 1,
            truncated: 0,
        }
    }

    #[test]
    fn batch_has_one_quad_per_plain_tile() {
        let plan = plan_of(vec![
            TileInstance {
                x: 0,
                y: 0,
                color: [10, 20, 30, 255],
                selected: false,
                lod: LodTier::High,
            },
            TileInstance {
                x: 3,
                y: 4,
                color: [40, 50, 60, 255],
                selected: false,
                lod: LodTier::Low,
            },
        ]);
        let cpu = build_tile_batch(&plan);
        assert_eq!(cpu.quad_count(), 2);
        assert_eq!(cpu.pos.len(), 2 * 4 * 3);
        assert_eq!(cpu.col.len(), 2 * 4 * 4);
        assert_eq!(cpu.col[0..4], [10, 20, 30, 255]);
        // second tile's quad starts at world (3, 4)
        assert_eq!(cpu.pos[12], 3.0);
        assert_eq!(cpu.pos[14], 4.0);
        // LOD tier rides in normal.x
        assert_eq!(cpu.norm[0], 0.0);
        assert_eq!(cpu.norm[12], 2.0);
    }

    #[test]
    fn selected_tile_adds_border_quads() {
        let plan = plan_of(vec![TileInstance {
            x: 2,
            y: 2,
            color: [1, 2, 3, 255],
            selected: true,
            lod: LodTier::High,
        }]);
        let cpu = build_tile_batch(&plan);
        assert_eq!(cpu.quad_count(), 5);
        // border quads sit above the fill
        assert_eq!(cpu.pos[1], TILE_LIFT);
        assert_eq!(cpu.pos[13], BORDER_LIFT);
    }

    #[test]
    fn quad_cap_keeps_every_index_in_sixteen_bits() {
        // Highest vertex index of the last admitted quad.
        assert!((MAX_BATCH_QUADS - 1) * 4 + 3 <= u16::MAX as usize);
        // The largest quality budget plus a selection border fits without
        // dropping anything.
        assert!(12_000 + 4 <= MAX_BATCH_QUADS);
    }

    #[test]
    fn path_points_land_on_cell_centers() {
        let path = vec![GridCoordinate::new(0, 0), GridCoordinate::new(1, 1)];
        let pts = path_to_world(&path, 0.05);
        assert_eq!(pts.len(), 2);
        assert_eq!((pts[0].x, pts[0].y, pts[0].z), (0.5, 0.05, 0.5));
        assert_eq!((pts[1].x, pts[1].z), (1.5, 1.5));
    }
}
