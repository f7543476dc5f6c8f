use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use isogrid_grid::{GridCoordinate, GridSize};

pub const SQRT_2: f32 = std::f32::consts::SQRT_2;

const ORTHO_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAG_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Octile distance: admissible for the 1 / sqrt(2) move-cost model.
#[inline]
pub fn octile_heuristic(a: GridCoordinate, b: GridCoordinate) -> f32 {
    let dx = (a.x - b.x).abs() as f32;
    let dy = (a.y - b.y).abs() as f32;
    let lo = dx.min(dy);
    let hi = dx.max(dy);
    SQRT_2 * lo + (hi - lo)
}

struct OpenEntry {
    est: f32,
    cost: f32,
    pos: GridCoordinate,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.est == other.est && self.cost == other.cost
    }
}
impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the entry with the lowest estimate.
        other
            .est
            .total_cmp(&self.est)
            .then_with(|| other.cost.total_cmp(&self.cost))
    }
}
impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Obstacle set for one routing query: the active cells, minus the two
/// endpoints (a connection may start and end on occupied tiles).
pub struct ObstacleSet {
    blocked: HashSet<GridCoordinate>,
}

impl ObstacleSet {
    pub fn new(
        active: impl IntoIterator<Item = GridCoordinate>,
        exempt_a: GridCoordinate,
        exempt_b: GridCoordinate,
    ) -> Self {
        let mut blocked: HashSet<GridCoordinate> = active.into_iter().collect();
        blocked.remove(&exempt_a);
        blocked.remove(&exempt_b);
        Self { blocked }
    }

    #[inline]
    pub fn is_blocked(&self, c: GridCoordinate) -> bool {
        self.blocked.contains(&c)
    }
}

/// A* over the grid rectangle. Moves cost 1 orthogonally and sqrt(2)
/// diagonally (when `diagonal` is set). Returns the reconstructed
/// coordinate path from `from` to `to`, or `None` when the target is
/// unreachable -- a normal outcome, not an error.
pub fn find_path(
    from: GridCoordinate,
    to: GridCoordinate,
    obstacles: &ObstacleSet,
    grid: GridSize,
    diagonal: bool,
) -> Option<Vec<GridCoordinate>> {
    if !grid.contains(from) || !grid.contains(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut best_cost: HashMap<GridCoordinate, f32> = HashMap::new();
    let mut came_from: HashMap<GridCoordinate, GridCoordinate> = HashMap::new();
    let mut open = BinaryHeap::new();
    best_cost.insert(from, 0.0);
    open.push(OpenEntry {
        est: octile_heuristic(from, to),
        cost: 0.0,
        pos: from,
    });

    while let Some(OpenEntry { cost, pos, .. }) = open.pop() {
        if pos == to {
            return Some(reconstruct(&came_from, to));
        }
        // Stale heap entry: a cheaper route to this cell already ran.
        if best_cost.get(&pos).copied().unwrap_or(f32::INFINITY) < cost {
            continue;
        }
        let step = |dx: i32, dy: i32, step_cost: f32| (pos.offset(dx, dy), step_cost);
        let ortho = ORTHO_DIRS.iter().map(|&(dx, dy)| step(dx, dy, 1.0));
        let diag = DIAG_DIRS
            .iter()
            .filter(|_| diagonal)
            .map(|&(dx, dy)| step(dx, dy, SQRT_2));
        for (next, step_cost) in ortho.chain(diag) {
            if !grid.contains(next) {
                continue;
            }
            if next != to && obstacles.is_blocked(next) {
                continue;
            }
            let next_cost = cost + step_cost;
            if next_cost >= best_cost.get(&next).copied().unwrap_or(f32::INFINITY) {
                continue;
            }
            best_cost.insert(next, next_cost);
            came_from.insert(next, pos);
            open.push(OpenEntry {
                est: next_cost + octile_heuristic(next, to),
                cost: next_cost,
                pos: next,
            });
        }
    }
    None
}

fn reconstruct(
    came_from: &HashMap<GridCoordinate, GridCoordinate>,
    to: GridCoordinate,
) -> Vec<GridCoordinate> {
    let mut path = vec![to];
    let mut cur = to;
    while let Some(&prev) = came_from.get(&cur) {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> ObstacleSet {
        ObstacleSet::new([], GridCoordinate::new(0, 0), GridCoordinate::new(0, 0))
    }

    #[test]
    fn straight_line_on_open_grid() {
        let p = find_path(
            GridCoordinate::new(0, 0),
            GridCoordinate::new(4, 0),
            &open_grid(),
            GridSize::new(10, 10),
            false,
        )
        .unwrap();
        assert_eq!(p.len(), 5);
        assert_eq!(p[0], GridCoordinate::new(0, 0));
        assert_eq!(p[4], GridCoordinate::new(4, 0));
    }

    #[test]
    fn diagonal_moves_shorten_the_path() {
        let from = GridCoordinate::new(0, 0);
        let to = GridCoordinate::new(5, 5);
        let grid = GridSize::new(10, 10);
        let ortho = find_path(from, to, &open_grid(), grid, false).unwrap();
        let diag = find_path(from, to, &open_grid(), grid, true).unwrap();
        assert_eq!(ortho.len(), 11);
        assert_eq!(diag.len(), 6);
    }

    #[test]
    fn walled_off_target_is_unreachable() {
        let from = GridCoordinate::new(0, 0);
        let to = GridCoordinate::new(5, 5);
        let mut wall = Vec::new();
        for x in 4..=6 {
            for y in 4..=6 {
                if !(x == 5 && y == 5) {
                    wall.push(GridCoordinate::new(x, y));
                }
            }
        }
        let obstacles = ObstacleSet::new(wall, from, to);
        assert!(find_path(from, to, &obstacles, GridSize::new(10, 10), true).is_none());
    }

    #[test]
    fn endpoints_are_exempt_from_blocking() {
        let from = GridCoordinate::new(0, 0);
        let to = GridCoordinate::new(3, 0);
        // Both endpoints listed as active; the exemption must clear them.
        let obstacles = ObstacleSet::new([from, to], from, to);
        assert!(find_path(from, to, &obstacles, GridSize::new(5, 5), false).is_some());
    }
}
