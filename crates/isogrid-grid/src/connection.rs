use serde::{Deserialize, Serialize};

use crate::coord::GridCoordinate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Bi,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStyle {
    #[default]
    Straight,
    Rounded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
}

/// User-drawn link between two nodes. A stored `path`, when present,
/// starts and ends at the endpoints' coordinates; self-loops always carry
/// a closed path of exactly 5 points.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub directed: bool,
    pub direction: Direction,
    pub style: ConnectionStyle,
    pub line_type: LineType,
    pub color: String,
    /// `None` means "derive on demand".
    pub path: Option<Vec<GridCoordinate>>,
}

impl Connection {
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from_id == self.to_id
    }

    /// Axis-aligned occupancy path: walk along x, then along y. Used only
    /// when no routed path is stored; deliberately cruder than the rendered
    /// geometry, so callers must not assume the two agree.
    pub fn fallback_path(from: GridCoordinate, to: GridCoordinate) -> Vec<GridCoordinate> {
        let mut out = Vec::new();
        let step_x = (to.x - from.x).signum();
        let mut c = from;
        out.push(c);
        while c.x != to.x {
            c.x += step_x;
            out.push(c);
        }
        let step_y = (to.y - from.y).signum();
        while c.y != to.y {
            c.y += step_y;
            out.push(c);
        }
        out
    }
}
