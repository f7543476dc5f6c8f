use serde::{Deserialize, Serialize};

use crate::coord::GridCoordinate;

/// Floor color meaning "unpainted"; such tiles draw nothing unless active.
pub const UNPAINTED_FLOOR: &str = "#ffffff";

/// One cell of the initialized grid. Exactly one node exists per occupied
/// coordinate; `active = false` nodes are never pathfinding obstacles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: GridCoordinate,
    pub active: bool,
    pub floor_color: String,
    pub object_color: String,
    pub shape: String,
    pub max_connections: Option<u32>,
}

impl Node {
    pub fn empty(id: String, position: GridCoordinate) -> Self {
        Self {
            id,
            position,
            active: false,
            floor_color: UNPAINTED_FLOOR.to_string(),
            object_color: UNPAINTED_FLOOR.to_string(),
            shape: String::new(),
            max_connections: None,
        }
    }

    /// A node contributes a tile instance when it holds an object or a
    /// painted floor.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        self.active || self.floor_color != UNPAINTED_FLOOR
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA bytes. Missing alpha is 255.
pub fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.strip_prefix('#')?;
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_rgb_and_rgba() {
        assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("#11223344"), Some([17, 34, 51, 68]));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#ff80"), None);
    }

    #[test]
    fn empty_node_is_not_renderable() {
        let n = Node::empty("n0".into(), GridCoordinate::new(1, 2));
        assert!(!n.is_renderable());
    }

    #[test]
    fn painted_floor_is_renderable() {
        let mut n = Node::empty("n0".into(), GridCoordinate::new(1, 2));
        n.floor_color = "#336699".into();
        assert!(n.is_renderable());
    }
}
