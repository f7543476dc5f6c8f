//! Tile-grid data model: coordinates, nodes, connections, and the owning
//! store with revision-based change tracking.
#![forbid(unsafe_code)]

mod connection;
mod coord;
mod model;
mod node;

pub use connection::{Connection, ConnectionStyle, Direction, LineType};
pub use coord::{GridCoordinate, GridSize};
pub use model::{GridModel, GridModelStats};
pub use node::{Node, UNPAINTED_FLOOR, parse_hex_color};
