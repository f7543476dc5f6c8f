use log::info;
use raylib::prelude::*;

use super::{App, EditEvent};
use isogrid_camera::{CameraController, IsoDirection};
use isogrid_grid::GridCoordinate;
use isogrid_render_raylib::{GroundShader, TileShader};

/// Below this angular distance the eased rotation snaps to its target.
const ROTATION_SNAP_DEG: f32 = 0.1;
const ROTATION_EASE_RATE: f32 = 10.0;
const KEY_PAN_SPEED: f32 = 40.0;
const WHEEL_FOV_STEP: f32 = 1.25;

impl App {
    pub fn step(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, dt: f32) {
        self.quality.record_frame(rl.get_time() * 1000.0);

        // Shader hot-reload
        if self.shader_event_rx.try_iter().next().is_some() {
            if let Some(gs) = GroundShader::load_with_base(rl, thread, &self.assets_root)
                .or_else(|| GroundShader::load(rl, thread))
            {
                self.ground_shader = Some(gs);
            }
            if let Some(ts) = TileShader::load_with_base(rl, thread, &self.assets_root)
                .or_else(|| TileShader::load(rl, thread))
            {
                self.tile_shader = Some(ts);
            }
            let gsize = self.model.grid_size();
            if let Some(gs) = self.ground_shader.as_mut() {
                gs.set_grid_extent(gsize.width as f32, gsize.height as f32);
            }
            self.bind_shaders();
            info!("reloaded shaders and rebound on existing models");
        }

        if self.ground_dirty {
            let gs = self.model.grid_size();
            self.ground_model =
                isogrid_render_raylib::upload_ground(rl, thread, gs.width, gs.height);
            self.bind_shaders();
            self.ground_dirty = false;
        }

        let vw = rl.get_screen_width() as f32;
        let vh = rl.get_screen_height() as f32;
        self.cam.set_aspect(vw / vh.max(1.0));

        self.ease_rotation(dt);
        self.handle_keys(rl, dt);
        self.handle_mouse(rl, vw, vh);
    }

    fn ease_rotation(&mut self, dt: f32) {
        let current = self.cam.rotation_deg();
        let mut diff = (self.rotation_target_deg - current) % 360.0;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }
        if diff.abs() < ROTATION_SNAP_DEG {
            if diff != 0.0 {
                self.cam.set_rotation(self.rotation_target_deg);
            }
            return;
        }
        let t = (dt * ROTATION_EASE_RATE).min(1.0);
        self.cam.set_rotation(current + diff * t);
    }

    fn handle_keys(&mut self, rl: &RaylibHandle, dt: f32) {
        // Keyboard panning scales with zoom so travel feels constant
        // on screen.
        let speed = KEY_PAN_SPEED * dt * (self.cam.zoom_percent() / 275.0).max(0.2);
        if rl.is_key_down(KeyboardKey::KEY_W) || rl.is_key_down(KeyboardKey::KEY_UP) {
            self.cam.move_isometric(IsoDirection::Up, speed);
        }
        if rl.is_key_down(KeyboardKey::KEY_S) || rl.is_key_down(KeyboardKey::KEY_DOWN) {
            self.cam.move_isometric(IsoDirection::Down, speed);
        }
        if rl.is_key_down(KeyboardKey::KEY_A) || rl.is_key_down(KeyboardKey::KEY_LEFT) {
            self.cam.move_isometric(IsoDirection::Left, speed);
        }
        if rl.is_key_down(KeyboardKey::KEY_D) || rl.is_key_down(KeyboardKey::KEY_RIGHT) {
            self.cam.move_isometric(IsoDirection::Right, speed);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_Q) {
            self.rotation_target_deg = (self.rotation_target_deg - 90.0).rem_euclid(360.0);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_E) {
            self.rotation_target_deg = (self.rotation_target_deg + 90.0).rem_euclid(360.0);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_R) {
            let gs = self.model.grid_size();
            self.apply_edit(EditEvent::ReinitGrid { size: gs });
        }
        if rl.is_key_pressed(KeyboardKey::KEY_X) {
            if let Some(at) = self.selected_coord() {
                self.apply_edit(EditEvent::ClearCell { at });
            }
        }
        if rl.is_key_pressed(KeyboardKey::KEY_C) {
            match (self.pending_connect.take(), self.selected_id.clone()) {
                (Some(from_id), Some(to_id)) => {
                    self.apply_edit(EditEvent::Connect { from_id, to_id });
                }
                (None, Some(sel)) => self.pending_connect = Some(sel),
                _ => {}
            }
        }
    }

    fn handle_mouse(&mut self, rl: &RaylibHandle, vw: f32, vh: f32) {
        let m = rl.get_mouse_position();

        let wheel = rl.get_mouse_wheel_move();
        if wheel != 0.0 {
            self.cam.set_fov(self.cam.fov_deg() - wheel * WHEEL_FOV_STEP);
        }

        if rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_RIGHT)
            || rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_MIDDLE)
        {
            if self.dragging {
                let dx = m.x - self.last_mouse.0;
                let dy = m.y - self.last_mouse.1;
                if dx != 0.0 || dy != 0.0 {
                    self.cam.pan_screen(dx, dy, vw, vh);
                }
            }
            self.dragging = true;
        } else {
            self.dragging = false;
        }
        self.last_mouse = (m.x, m.y);

        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            if let Some(at) = self.pick_cell(m.x, m.y, vw, vh) {
                if rl.is_key_down(KeyboardKey::KEY_LEFT_SHIFT) {
                    self.apply_edit(EditEvent::ToggleNode { at });
                } else if rl.is_key_down(KeyboardKey::KEY_LEFT_CONTROL) {
                    self.apply_edit(EditEvent::PaintFloor {
                        at,
                        color: "#d8e2dc".to_string(),
                    });
                } else {
                    self.apply_edit(EditEvent::Select { at });
                }
            }
        }
    }

    fn pick_cell(&mut self, mx: f32, my: f32, vw: f32, vh: f32) -> Option<GridCoordinate> {
        let ray = self.cam.ray_at(mx, my, vw, vh)?;
        let hit = CameraController::intersect_ground(ray)?;
        let at = GridCoordinate::new(hit.x.floor() as i32, hit.z.floor() as i32);
        if self.model.grid_size().contains(at) {
            Some(at)
        } else {
            None
        }
    }

    fn selected_coord(&self) -> Option<GridCoordinate> {
        let id = self.selected_id.as_deref()?;
        self.model.node(id).map(|n| n.position)
    }
}
