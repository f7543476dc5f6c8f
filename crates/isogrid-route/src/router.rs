use log::debug;

use isogrid_grid::{
    Connection, ConnectionStyle, Direction, GridCoordinate, GridModel, GridSize, LineType,
};

use crate::astar::{ObstacleSet, find_path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteError {
    UnknownNode(String),
    /// An endpoint already sits at its `max_connections` degree cap.
    DegreeCap(String),
    /// No route exists between the endpoints; the caller rejects the
    /// request or falls back to a degraded path.
    NoPath,
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::UnknownNode(id) => write!(f, "unknown node {id}"),
            RouteError::DegreeCap(id) => write!(f, "node {id} is at its connection limit"),
            RouteError::NoPath => write!(f, "no route between endpoints"),
        }
    }
}

impl std::error::Error for RouteError {}

/// Styling and routing options for one `create_connection` call.
#[derive(Clone, Debug)]
pub struct RouteOptions {
    pub directed: bool,
    pub direction: Direction,
    pub style: ConnectionStyle,
    pub line_type: LineType,
    pub color: String,
    /// User-drawn waypoints; densified and collision-checked before use.
    pub custom_path: Option<Vec<GridCoordinate>>,
    pub diagonal: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            directed: false,
            direction: Direction::Forward,
            style: ConnectionStyle::Straight,
            line_type: LineType::Solid,
            color: "#000000".to_string(),
            custom_path: None,
            diagonal: true,
        }
    }
}

/// Fill the gaps between consecutive waypoints with unit steps: walk
/// diagonally while both axes differ, then orthogonally. Densifying an
/// already-dense path returns it unchanged.
pub fn densify_path(waypoints: &[GridCoordinate]) -> Vec<GridCoordinate> {
    let mut out: Vec<GridCoordinate> = Vec::with_capacity(waypoints.len());
    let Some(&first) = waypoints.first() else {
        return out;
    };
    out.push(first);
    let mut cur = first;
    for &next in &waypoints[1..] {
        while cur != next {
            let dx = (next.x - cur.x).signum();
            let dy = (next.y - cur.y).signum();
            cur = cur.offset(dx, dy);
            out.push(cur);
        }
    }
    out
}

/// Collision = any cell of the path (excluding its two end cells) sits on
/// an active node.
fn path_collides(path: &[GridCoordinate], obstacles: &ObstacleSet) -> bool {
    if path.len() <= 2 {
        return false;
    }
    path[1..path.len() - 1].iter().any(|&c| obstacles.is_blocked(c))
}

/// Closed 5-point self-loop hugging a free adjacent quadrant. Right/down
/// is preferred; a quadrant is skipped when it leaves the grid or touches
/// an active cell. With every quadrant taken, the loop falls back to the
/// in-bounds right/down shape and tolerates the overlap.
pub fn self_loop_path(
    at: GridCoordinate,
    grid: GridSize,
    obstacles: &ObstacleSet,
) -> Vec<GridCoordinate> {
    const QUADRANTS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
    let (dx, dy) = QUADRANTS
        .into_iter()
        .find(|&(dx, dy)| {
            [at.offset(dx, 0), at.offset(dx, dy), at.offset(0, dy)]
                .into_iter()
                .all(|c| grid.contains(c) && !obstacles.is_blocked(c))
        })
        .unwrap_or((
            if at.x + 1 < grid.width { 1 } else { -1 },
            if at.y + 1 < grid.height { 1 } else { -1 },
        ));
    vec![
        at,
        at.offset(dx, 0),
        at.offset(dx, dy),
        at.offset(0, dy),
        at,
    ]
}

/// Stateless routing facade over the grid model. Builds `Connection`
/// values for the caller to store; never mutates the model itself.
pub struct ConnectionRouter;

impl ConnectionRouter {
    /// Route a new connection between two nodes. The returned connection
    /// always carries a stored path except when even the fallback A*
    /// fails, which surfaces as `RouteError::NoPath`.
    pub fn create_connection(
        id: impl Into<String>,
        from_id: &str,
        to_id: &str,
        model: &GridModel,
        opts: RouteOptions,
    ) -> Result<Connection, RouteError> {
        let from = model
            .node(from_id)
            .ok_or_else(|| RouteError::UnknownNode(from_id.to_string()))?;
        let to = model
            .node(to_id)
            .ok_or_else(|| RouteError::UnknownNode(to_id.to_string()))?;

        for node in [from, to] {
            if let Some(cap) = node.max_connections {
                if model.connection_count(&node.id) >= cap as usize {
                    return Err(RouteError::DegreeCap(node.id.clone()));
                }
            }
        }

        let grid = model.grid_size();
        let obstacles = ObstacleSet::new(
            model
                .nodes()
                .iter()
                .filter(|n| n.active)
                .map(|n| n.position),
            from.position,
            to.position,
        );
        let path = if from_id == to_id {
            self_loop_path(from.position, grid, &obstacles)
        } else {
            match &opts.custom_path {
                None => find_path(from.position, to.position, &obstacles, grid, opts.diagonal)
                    .ok_or(RouteError::NoPath)?,
                Some(waypoints) => Self::route_custom(
                    waypoints,
                    from.position,
                    to.position,
                    &obstacles,
                    grid,
                    opts.diagonal,
                )?,
            }
        };

        Ok(Connection {
            id: id.into(),
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            directed: opts.directed,
            direction: opts.direction,
            style: opts.style,
            line_type: opts.line_type,
            color: opts.color,
            path: Some(path),
        })
    }

    /// Anchor the user-drawn waypoints at the endpoint nodes and densify;
    /// when the dense path collides with occupied cells, re-route each
    /// consecutive waypoint pair with A* and concatenate, falling back to
    /// a direct A* between the true endpoints.
    fn route_custom(
        waypoints: &[GridCoordinate],
        from: GridCoordinate,
        to: GridCoordinate,
        obstacles: &ObstacleSet,
        grid: GridSize,
        diagonal: bool,
    ) -> Result<Vec<GridCoordinate>, RouteError> {
        // The drag rarely starts or ends exactly on the node cells; the
        // stored path must.
        let mut anchored: Vec<GridCoordinate> = Vec::with_capacity(waypoints.len() + 2);
        if waypoints.first() != Some(&from) {
            anchored.push(from);
        }
        anchored.extend_from_slice(waypoints);
        if anchored.last() != Some(&to) {
            anchored.push(to);
        }
        if anchored.len() < 2 {
            return find_path(from, to, obstacles, grid, diagonal).ok_or(RouteError::NoPath);
        }
        let dense = densify_path(&anchored);
        if !path_collides(&dense, obstacles) {
            return Ok(dense);
        }
        debug!(
            "custom path collides ({} pts); re-routing per segment",
            dense.len()
        );
        if let Some(stitched) = Self::route_segments(&anchored, obstacles, grid, diagonal) {
            return Ok(stitched);
        }
        find_path(from, to, obstacles, grid, diagonal).ok_or(RouteError::NoPath)
    }

    fn route_segments(
        waypoints: &[GridCoordinate],
        obstacles: &ObstacleSet,
        grid: GridSize,
        diagonal: bool,
    ) -> Option<Vec<GridCoordinate>> {
        let mut out: Vec<GridCoordinate> = Vec::new();
        for pair in waypoints.windows(2) {
            let seg = find_path(pair[0], pair[1], obstacles, grid, diagonal)?;
            // Segments share their joint waypoint; keep it once.
            let skip = usize::from(!out.is_empty());
            out.extend(seg.into_iter().skip(skip));
        }
        Some(out)
    }

    /// Whether any connection's geometry covers the tile at `(x, y)`. Uses
    /// the stored path when present; otherwise the crude axis-aligned
    /// fallback, which may not match the rendered geometry.
    pub fn is_tile_occupied_by_connection(x: i32, y: i32, model: &GridModel) -> bool {
        Self::connection_at(x, y, model).is_some()
    }

    /// First connection (in insertion order) whose path covers `(x, y)`.
    pub fn connection_at(x: i32, y: i32, model: &GridModel) -> Option<&Connection> {
        let probe = GridCoordinate::new(x, y);
        model.connections().iter().find(|conn| {
            match &conn.path {
                Some(path) => path.contains(&probe),
                None => {
                    let (Some(from), Some(to)) =
                        (model.node(&conn.from_id), model.node(&conn.to_id))
                    else {
                        return false;
                    };
                    Connection::fallback_path(from.position, to.position).contains(&probe)
                }
            }
        })
    }
}
