use log::{info, warn};

use super::App;
use isogrid_camera::BASE_ROTATION_DEG;
use isogrid_grid::{GridCoordinate, GridSize, UNPAINTED_FLOOR};
use isogrid_route::{ConnectionRouter, RouteOptions};

/// Grid edits raised by input handling and applied between ticks. Each
/// application bumps the model revision and rebuilds the spatial index,
/// so the next frame plan sees a consistent snapshot.
#[derive(Clone, Debug)]
pub enum EditEvent {
    ToggleNode { at: GridCoordinate },
    PaintFloor { at: GridCoordinate, color: String },
    ClearCell { at: GridCoordinate },
    Select { at: GridCoordinate },
    Connect { from_id: String, to_id: String },
    ReinitGrid { size: GridSize },
}

impl App {
    pub fn apply_edit(&mut self, event: EditEvent) {
        match event {
            EditEvent::ToggleNode { at } => {
                let Some(id) = self.node_id_at(at) else {
                    return;
                };
                self.model.update_node(&id, |n| {
                    n.active = !n.active;
                    if n.active && n.object_color == UNPAINTED_FLOOR {
                        n.object_color = "#4a6fa5".to_string();
                    }
                });
                self.index = Self::build_spatial(&self.model);
            }
            EditEvent::PaintFloor { at, color } => {
                let Some(id) = self.node_id_at(at) else {
                    return;
                };
                self.model.update_node(&id, |n| n.floor_color = color);
                self.index = Self::build_spatial(&self.model);
            }
            EditEvent::ClearCell { at } => {
                let Some(id) = self.node_id_at(at) else {
                    return;
                };
                self.model.update_node(&id, |n| {
                    n.active = false;
                    n.floor_color = UNPAINTED_FLOOR.to_string();
                    n.object_color = UNPAINTED_FLOOR.to_string();
                });
                if self.selected_id.as_deref() == Some(id.as_str()) {
                    self.selected_id = None;
                }
                self.index = Self::build_spatial(&self.model);
            }
            EditEvent::Select { at } => {
                self.selected_id = self.node_id_at(at);
            }
            EditEvent::Connect { from_id, to_id } => {
                let id = format!("c{}", self.next_connection_seq);
                let opts = RouteOptions {
                    diagonal: self.diagonal_routing,
                    ..RouteOptions::default()
                };
                match ConnectionRouter::create_connection(id, &from_id, &to_id, &self.model, opts)
                {
                    Ok(conn) => {
                        self.next_connection_seq += 1;
                        info!("connected {} -> {}", conn.from_id, conn.to_id);
                        self.model.add_connection(conn);
                    }
                    Err(e) => warn!("connection rejected: {}", e),
                }
            }
            EditEvent::ReinitGrid { size } => {
                self.model.reinit(size);
                self.index = Self::build_spatial(&self.model);
                self.selected_id = None;
                self.pending_connect = None;
                self.tile_batch = None;
                self.last_plan_hash = None;
                self.ground_dirty = true;
                self.cam.set_isometric(
                    size.width as f32 * 0.5,
                    size.height as f32 * 0.5,
                    BASE_ROTATION_DEG,
                );
                self.rotation_target_deg = self.cam.rotation_deg();
                if let Some(gs) = self.ground_shader.as_mut() {
                    gs.set_grid_extent(size.width as f32, size.height as f32);
                }
                info!("grid reinitialized to {}x{}", size.width, size.height);
            }
        }
    }

    fn node_id_at(&self, at: GridCoordinate) -> Option<String> {
        self.model.node_at(at).map(|n| n.id.clone())
    }
}
