use hashbrown::HashSet;
use isogrid_grid::{GridCoordinate, GridSize};
use isogrid_route::{ObstacleSet, SQRT_2, find_path, octile_heuristic};
use proptest::prelude::*;

/// Brute-force Dijkstra over the same move model, used as the ground truth
/// for optimal cost.
fn dijkstra_cost(
    from: GridCoordinate,
    to: GridCoordinate,
    blocked: &HashSet<GridCoordinate>,
    grid: GridSize,
    diagonal: bool,
) -> Option<f32> {
    let mut dist: Vec<Vec<f32>> =
        vec![vec![f32::INFINITY; grid.width as usize]; grid.height as usize];
    dist[from.y as usize][from.x as usize] = 0.0;
    let mut frontier = vec![from];
    while !frontier.is_empty() {
        // Settle the cheapest frontier cell (small grids, O(n^2) is fine).
        frontier.sort_by(|a, b| {
            dist[b.y as usize][b.x as usize].total_cmp(&dist[a.y as usize][a.x as usize])
        });
        let cur = frontier.pop().unwrap();
        let d = dist[cur.y as usize][cur.x as usize];
        let mut moves = vec![(1, 0, 1.0), (-1, 0, 1.0), (0, 1, 1.0), (0, -1, 1.0)];
        if diagonal {
            moves.extend([
                (1, 1, SQRT_2),
                (1, -1, SQRT_2),
                (-1, 1, SQRT_2),
                (-1, -1, SQRT_2),
            ]);
        }
        for (dx, dy, c) in moves {
            let n = cur.offset(dx, dy);
            if !grid.contains(n) || (n != to && n != from && blocked.contains(&n)) {
                continue;
            }
            let nd = d + c;
            if nd < dist[n.y as usize][n.x as usize] - 1e-6 {
                dist[n.y as usize][n.x as usize] = nd;
                frontier.push(n);
            }
        }
    }
    let d = dist[to.y as usize][to.x as usize];
    if d.is_finite() { Some(d) } else { None }
}

fn path_cost(path: &[GridCoordinate]) -> f32 {
    path.windows(2)
        .map(|w| {
            let dx = (w[1].x - w[0].x).abs();
            let dy = (w[1].y - w[0].y).abs();
            if dx == 1 && dy == 1 { SQRT_2 } else { 1.0 }
        })
        .sum()
}

proptest! {
    // Whenever a path exists it starts at `from`, ends at `to`, takes only
    // legal unit steps, avoids every obstacle, and is optimal.
    #[test]
    fn astar_paths_are_legal_and_optimal(
        obstacles in prop::collection::hash_set((0i32..12, 0i32..12), 0..40),
        fx in 0i32..12, fy in 0i32..12,
        tx in 0i32..12, ty in 0i32..12,
        diagonal in any::<bool>(),
    ) {
        let grid = GridSize::new(12, 12);
        let from = GridCoordinate::new(fx, fy);
        let to = GridCoordinate::new(tx, ty);
        let blocked: HashSet<GridCoordinate> = obstacles
            .iter()
            .map(|&(x, y)| GridCoordinate::new(x, y))
            .collect();
        let set = ObstacleSet::new(blocked.iter().copied(), from, to);
        let found = find_path(from, to, &set, grid, diagonal);
        let reference = dijkstra_cost(from, to, &blocked, grid, diagonal);

        match (found, reference) {
            (Some(path), Some(best)) => {
                prop_assert_eq!(path[0], from);
                prop_assert_eq!(*path.last().unwrap(), to);
                for w in path.windows(2) {
                    prop_assert!(w[0].is_unit_step_to(w[1]));
                    if !diagonal {
                        prop_assert!((w[1].x - w[0].x).abs() + (w[1].y - w[0].y).abs() == 1);
                    }
                }
                // from == to yields a single-point path with no interior.
                if path.len() > 2 {
                    for &c in &path[1..path.len() - 1] {
                        prop_assert!(!blocked.contains(&c) || c == from || c == to);
                    }
                }
                prop_assert!((path_cost(&path) - best).abs() < 1e-3);
            }
            (None, None) => {}
            (got, want) => {
                prop_assert!(false, "A* and Dijkstra disagree: {:?} vs {:?}", got.map(|p| p.len()), want);
            }
        }
    }

    // Octile heuristic admissibility: never exceeds the true optimal cost
    // on an empty grid.
    #[test]
    fn octile_never_overestimates(
        ax in 0i32..15, ay in 0i32..15,
        bx in 0i32..15, by in 0i32..15,
    ) {
        let a = GridCoordinate::new(ax, ay);
        let b = GridCoordinate::new(bx, by);
        let grid = GridSize::new(15, 15);
        let set = ObstacleSet::new([], a, b);
        let path = find_path(a, b, &set, grid, true).unwrap();
        prop_assert!(octile_heuristic(a, b) <= path_cost(&path) + 1e-4);
    }
}
