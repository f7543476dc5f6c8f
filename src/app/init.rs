use std::path::PathBuf;

use raylib::prelude::*;

use super::{App, DebugStats};
use isogrid_camera::{BASE_ROTATION_DEG, CameraController, ProjectionCache};
use isogrid_grid::{GridModel, GridSize};
use isogrid_quality::{QualityController, QualityLevel};
use isogrid_render_raylib::{GroundShader, TileShader, upload_ground};
use isogrid_spatial::{Region, SpatialIndex};

impl App {
    pub fn new(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        grid_size: GridSize,
        diagonal_routing: bool,
        forced_quality: Option<QualityLevel>,
        watch_shaders: bool,
        assets_root: PathBuf,
    ) -> Self {
        let model = GridModel::new(grid_size);
        let index = Self::build_spatial(&model);

        let aspect = rl.get_screen_width() as f32 / rl.get_screen_height().max(1) as f32;
        let mut cam = CameraController::new(aspect);
        cam.set_isometric(
            grid_size.width as f32 * 0.5,
            grid_size.height as f32 * 0.5,
            BASE_ROTATION_DEG,
        );
        let rotation_target_deg = cam.rotation_deg();

        let mut quality = QualityController::new();
        quality.force_level(forced_quality);

        let mut ground_shader = GroundShader::load_with_base(rl, thread, &assets_root)
            .or_else(|| GroundShader::load(rl, thread));
        if let Some(gs) = ground_shader.as_mut() {
            gs.set_grid_extent(grid_size.width as f32, grid_size.height as f32);
        }
        let tile_shader = TileShader::load_with_base(rl, thread, &assets_root)
            .or_else(|| TileShader::load(rl, thread));
        let ground_model = upload_ground(rl, thread, grid_size.width, grid_size.height);

        let (shader_tx, shader_event_rx) = std::sync::mpsc::channel::<()>();
        if watch_shaders {
            super::watchers::spawn_shader_watcher(assets_root.clone(), shader_tx);
        }

        let mut app = Self {
            model,
            index,
            cam,
            rotation_target_deg,
            proj_cache: ProjectionCache::new(),
            quality,
            debug_stats: DebugStats::default(),
            ground_model,
            ground_shader,
            tile_shader,
            tile_batch: None,
            last_plan_hash: None,
            ground_dirty: false,
            selected_id: None,
            pending_connect: None,
            diagonal_routing,
            next_connection_seq: 0,
            dragging: false,
            last_mouse: (0.0, 0.0),
            assets_root,
            shader_event_rx,
        };
        app.bind_shaders();
        app
    }

    pub(crate) fn build_spatial(model: &GridModel) -> SpatialIndex {
        let gs = model.grid_size();
        let mut index = SpatialIndex::new(Region::new(
            0.0,
            0.0,
            gs.width as f32,
            gs.height as f32,
        ));
        for (slot, n) in model.nodes().iter().enumerate() {
            index.insert(n.position.x as f32, n.position.y as f32, slot);
        }
        index
    }

    /// Point the ground and tile models at the current shader objects.
    /// Called after load and after hot-reload.
    pub(crate) fn bind_shaders(&mut self) {
        if let (Some(model), Some(gs)) = (self.ground_model.as_mut(), self.ground_shader.as_ref())
        {
            if let Some(mat) = model.materials_mut().get_mut(0) {
                let dest = mat.shader_mut();
                let dest_ptr: *mut raylib::ffi::Shader = dest.as_mut();
                let src_ptr: *const raylib::ffi::Shader = gs.shader.as_ref();
                unsafe { std::ptr::copy_nonoverlapping(src_ptr, dest_ptr, 1) };
            }
        }
        if let (Some(batch), Some(ts)) = (self.tile_batch.as_mut(), self.tile_shader.as_ref()) {
            if let Some(mat) = batch.model.materials_mut().get_mut(0) {
                let dest = mat.shader_mut();
                let dest_ptr: *mut raylib::ffi::Shader = dest.as_mut();
                let src_ptr: *const raylib::ffi::Shader = ts.shader.as_ref();
                unsafe { std::ptr::copy_nonoverlapping(src_ptr, dest_ptr, 1) };
            }
        }
    }
}
