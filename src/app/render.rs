use raylib::prelude::*;

use super::App;
use isogrid_camera::ScreenPoint;
use isogrid_frame::{plan_frame, visible_bounds};
use isogrid_geom::Vec3;
use isogrid_grid::{Connection, LineType, parse_hex_color};
use isogrid_render_raylib::{conv, path_to_world, to_camera3d, upload_tile_batch};

const CLEAR_COLOR: Color = Color::new(244, 244, 248, 255);
const CONNECTION_LIFT: f32 = 0.05;

impl App {
    /// Plan, upload if dirty, and submit one frame. Returns false when the
    /// view misses the ground plane entirely and nothing 3D was drawn.
    pub fn render(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread) -> bool {
        let vw = rl.get_screen_width() as f32;
        let vh = rl.get_screen_height() as f32;

        let Some(bounds) = visible_bounds(&mut self.cam, vw, vh) else {
            self.debug_stats.frames_skipped += 1;
            let mut d = rl.begin_drawing(thread);
            d.clear_background(CLEAR_COLOR);
            d.draw_text("view does not meet the ground plane", 12, 12, 20, Color::MAROON);
            return false;
        };

        let plan = plan_frame(
            self.model.nodes(),
            &self.index,
            bounds,
            self.cam.target(),
            self.selected_id.as_deref(),
            self.quality.settings(),
        );
        self.debug_stats.nodes_total = self.model.nodes().len();
        self.debug_stats.instances_drawn = plan.instances.len();
        self.debug_stats.instances_truncated = plan.truncated;

        // Camera-only motion leaves the hash unchanged and skips the upload.
        if self.last_plan_hash != Some(plan.content_hash) {
            self.tile_batch = upload_tile_batch(rl, thread, &plan);
            self.bind_shaders();
            self.last_plan_hash = Some(plan.content_hash);
            self.debug_stats.uploads += 1;
        } else {
            self.debug_stats.uploads_skipped += 1;
        }

        let cam3d = to_camera3d(&self.cam);
        let settings = *self.quality.settings();
        if let Some(gs) = self.ground_shader.as_mut() {
            gs.update_frame_uniforms(cam3d.position);
        }
        if let Some(ts) = self.tile_shader.as_mut() {
            ts.update_frame_uniforms(settings.textures_enabled);
        }

        let selected_screen = self.selected_screen_point(vw, vh);

        let mut d = rl.begin_drawing(thread);
        d.clear_background(CLEAR_COLOR);
        {
            let mut d3 = d.begin_mode3D(cam3d);
            // Background pass never writes depth, so tiles always win.
            if let Some(ground) = self.ground_model.as_ref() {
                unsafe {
                    raylib::ffi::rlDisableDepthMask();
                }
                d3.draw_model(ground, Vector3::zero(), 1.0, Color::WHITE);
                unsafe {
                    raylib::ffi::rlEnableDepthMask();
                }
            }
            if let Some(batch) = self.tile_batch.as_ref() {
                d3.draw_model(&batch.model, Vector3::zero(), 1.0, Color::WHITE);
            }
            let mut links = 0usize;
            for conn in self.model.connections() {
                let cells = match conn.path.as_deref() {
                    Some(p) => p.to_vec(),
                    None => {
                        let (Some(from), Some(to)) =
                            (self.model.node(&conn.from_id), self.model.node(&conn.to_id))
                        else {
                            continue;
                        };
                        Connection::fallback_path(from.position, to.position)
                    }
                };
                if cells.len() < 2 {
                    continue;
                }
                let color = parse_hex_color(&conn.color)
                    .map(conv::rgba_to_rl)
                    .unwrap_or(Color::BLACK);
                let pts = path_to_world(&cells, CONNECTION_LIFT);
                for (i, pair) in pts.windows(2).enumerate() {
                    // Dashed lines drop every other unit segment.
                    if conn.line_type == LineType::Dashed && i % 2 == 1 {
                        continue;
                    }
                    d3.draw_line_3D(pair[0], pair[1], color);
                }
                links += 1;
            }
            self.debug_stats.connections_drawn = links;
        }
        self.draw_overlay(&mut d, selected_screen);
        self.debug_stats.frames_rendered += 1;
        true
    }

    /// Project the selected tile's center to pixels through the memoized
    /// cache; a fixed camera reuses the cached entry every frame.
    fn selected_screen_point(&mut self, vw: f32, vh: f32) -> Option<(ScreenPoint, String)> {
        let id = self.selected_id.as_deref()?;
        let n = self.model.node(id)?;
        let center = Vec3::new(n.position.x as f32 + 0.5, 0.0, n.position.y as f32 + 0.5);
        let label = n.id.clone();
        let vp = self.cam.view_projection();
        let sp = self.proj_cache.world_to_screen_cached(&vp, center, vw, vh)?;
        Some((sp, label))
    }

    fn draw_overlay(&self, d: &mut RaylibDrawHandle, selected: Option<(ScreenPoint, String)>) {
        let q = &self.quality;
        let s = q.settings();
        d.draw_text(
            &format!(
                "{:5.1} fps  {:5.2} ms  [{}] msaa x{}{}",
                q.fps(),
                q.avg_frame_ms(),
                q.level().label(),
                s.msaa_samples,
                if s.shadows_enabled { "  shadows" } else { "" }
            ),
            12,
            12,
            20,
            Color::DARKGRAY,
        );
        let s = &self.debug_stats;
        d.draw_text(
            &format!(
                "tiles {} (-{})  links {}  uploads {}/{}",
                s.instances_drawn,
                s.instances_truncated,
                s.connections_drawn,
                s.uploads,
                s.uploads + s.uploads_skipped
            ),
            12,
            36,
            20,
            Color::DARKGRAY,
        );
        if let Some((sp, label)) = selected {
            d.draw_circle(sp.x as i32, sp.y as i32, 4.0, Color::DARKBLUE);
            d.draw_text(&label, sp.x as i32 + 8, sp.y as i32 - 10, 20, Color::DARKBLUE);
        } else if let Some(sel) = self.selected_id.as_deref() {
            // Selection exists but projects offscreen.
            d.draw_text(&format!("selected {}", sel), 12, 60, 20, Color::DARKBLUE);
        }
        if self.pending_connect.is_some() {
            d.draw_text("connecting... pick target, press C", 12, 84, 20, Color::DARKGREEN);
        }
    }
}
