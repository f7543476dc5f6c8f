use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use isogrid_camera::{CameraController, ProjectionCache};
use isogrid_grid::GridModel;
use isogrid_quality::QualityController;
use isogrid_render_raylib::{GroundShader, TileBatchRender, TileShader};
use isogrid_spatial::SpatialIndex;
use raylib::core::models::Model;

pub struct App {
    pub model: GridModel,
    pub index: SpatialIndex,
    pub cam: CameraController,
    /// Rotation eased toward this each tick (shortest arc).
    pub rotation_target_deg: f32,
    pub proj_cache: ProjectionCache,
    pub quality: QualityController,
    pub debug_stats: DebugStats,

    pub ground_model: Option<Model>,
    pub ground_shader: Option<GroundShader>,
    pub tile_shader: Option<TileShader>,
    pub tile_batch: Option<TileBatchRender>,
    /// Content hash of the last planned frame; `None` until the first plan.
    pub(crate) last_plan_hash: Option<u64>,
    /// Ground quad needs re-upload (grid size changed).
    pub(crate) ground_dirty: bool,

    pub selected_id: Option<String>,
    /// First endpoint of an in-progress connection (C + click twice).
    pub pending_connect: Option<String>,
    pub diagonal_routing: bool,
    pub(crate) next_connection_seq: u64,

    pub(crate) dragging: bool,
    pub(crate) last_mouse: (f32, f32),

    pub assets_root: PathBuf,
    pub(crate) shader_event_rx: Receiver<()>,
}

#[derive(Default)]
pub struct DebugStats {
    pub nodes_total: usize,
    pub instances_drawn: usize,
    pub instances_truncated: usize,
    pub connections_drawn: usize,
    pub uploads: usize,
    pub uploads_skipped: usize,
    pub frames_rendered: usize,
    pub frames_skipped: usize,
}
