use serde::{Deserialize, Serialize};

/// Addressable unit of the world: an integer tile coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: GridCoordinate) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    /// True when `other` is one legal 8-neighbor step away.
    #[inline]
    pub fn is_unit_step_to(self, other: GridCoordinate) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && (dx + dy) > 0
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<GridCoordinate> for (i32, i32) {
    fn from(value: GridCoordinate) -> Self {
        (value.x, value.y)
    }
}

/// Rectangle of addressable coordinates, origin at (0, 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(&self, c: GridCoordinate) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }
}
