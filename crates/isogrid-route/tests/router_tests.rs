use isogrid_grid::{GridCoordinate, GridModel, GridSize};
use isogrid_route::{
    ConnectionRouter, ObstacleSet, RouteError, RouteOptions, densify_path, self_loop_path,
};

fn model_10x10() -> GridModel {
    GridModel::new(GridSize::new(10, 10))
}

fn id_at(model: &GridModel, x: i32, y: i32) -> String {
    model
        .node_at(GridCoordinate::new(x, y))
        .expect("coordinate inside grid")
        .id
        .clone()
}

fn activate(model: &mut GridModel, x: i32, y: i32) -> String {
    let id = id_at(model, x, y);
    model.update_node(&id, |n| n.active = true);
    id
}

#[test]
fn routes_around_an_obstacle() {
    // Scenario: 10x10 grid, obstacle at (2,2), diagonal route (0,0)-(5,5).
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 5, 5);
    activate(&mut model, 2, 2);

    let conn =
        ConnectionRouter::create_connection("c1", &from, &to, &model, RouteOptions::default())
            .unwrap();
    let path = conn.path.unwrap();
    assert_eq!(path[0], GridCoordinate::new(0, 0));
    assert_eq!(*path.last().unwrap(), GridCoordinate::new(5, 5));
    assert!(!path.contains(&GridCoordinate::new(2, 2)));
    for w in path.windows(2) {
        assert!(w[0].is_unit_step_to(w[1]));
    }
}

#[test]
fn self_loop_has_exactly_five_points() {
    // Scenario: from == to at (5,5) returns a closed 5-point loop.
    let mut model = model_10x10();
    let id = activate(&mut model, 5, 5);
    let conn =
        ConnectionRouter::create_connection("loop", &id, &id, &model, RouteOptions::default())
            .unwrap();
    let path = conn.path.unwrap();
    assert_eq!(path.len(), 5);
    assert_eq!(path[0], GridCoordinate::new(5, 5));
    assert_eq!(path[4], GridCoordinate::new(5, 5));
    // Middle 3 points form a unit rectangle adjacent to the node.
    for &c in &path[1..4] {
        assert!((c.x - 5).abs() <= 1 && (c.y - 5).abs() <= 1);
        assert!(c != GridCoordinate::new(5, 5));
    }
}

#[test]
fn self_loop_prefers_right_down_and_falls_back_at_edges() {
    let grid = GridSize::new(10, 10);
    let open = ObstacleSet::new([], GridCoordinate::new(3, 3), GridCoordinate::new(3, 3));
    let interior = self_loop_path(GridCoordinate::new(3, 3), grid, &open);
    assert_eq!(interior[1], GridCoordinate::new(4, 3));
    assert_eq!(interior[2], GridCoordinate::new(4, 4));

    let corner = self_loop_path(GridCoordinate::new(9, 9), grid, &open);
    assert_eq!(corner.len(), 5);
    assert_eq!(corner[1], GridCoordinate::new(8, 9));
    assert_eq!(corner[2], GridCoordinate::new(8, 8));
}

#[test]
fn self_loop_swings_around_occupied_neighbors() {
    let grid = GridSize::new(10, 10);
    let at = GridCoordinate::new(5, 5);
    // The preferred right/down quadrant is taken by an active cell.
    let blocked = ObstacleSet::new([GridCoordinate::new(6, 5)], at, at);
    let path = self_loop_path(at, grid, &blocked);
    assert_eq!(path.len(), 5);
    assert_eq!(path[1], GridCoordinate::new(4, 5));
    for &c in &path[1..4] {
        assert!(!blocked.is_blocked(c));
    }

    // With all four quadrants occupied the loop still closes; overlapping
    // a neighbor beats refusing the self-connection.
    let ring: Vec<GridCoordinate> = (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dy| at.offset(dx, dy)))
        .filter(|&c| c != at)
        .collect();
    let walled = ObstacleSet::new(ring, at, at);
    let path = self_loop_path(at, grid, &walled);
    assert_eq!(path.len(), 5);
    assert_eq!(path[0], at);
    assert_eq!(path[4], at);
}

#[test]
fn densify_fills_gaps_diagonally_then_orthogonally() {
    let sparse = vec![GridCoordinate::new(0, 0), GridCoordinate::new(3, 1)];
    let dense = densify_path(&sparse);
    assert_eq!(
        dense,
        vec![
            GridCoordinate::new(0, 0),
            GridCoordinate::new(1, 1),
            GridCoordinate::new(2, 1),
            GridCoordinate::new(3, 1),
        ]
    );
}

#[test]
fn densify_is_idempotent() {
    let sparse = vec![
        GridCoordinate::new(0, 0),
        GridCoordinate::new(4, 2),
        GridCoordinate::new(4, 6),
    ];
    let once = densify_path(&sparse);
    let twice = densify_path(&once);
    assert_eq!(once, twice);
    for w in once.windows(2) {
        assert!(w[0].is_unit_step_to(w[1]));
    }
}

#[test]
fn clean_custom_path_is_kept_verbatim_after_densify() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 4, 0);
    let opts = RouteOptions {
        custom_path: Some(vec![
            GridCoordinate::new(0, 0),
            GridCoordinate::new(2, 2),
            GridCoordinate::new(4, 0),
        ]),
        ..Default::default()
    };
    let conn = ConnectionRouter::create_connection("c", &from, &to, &model, opts).unwrap();
    let path = conn.path.unwrap();
    assert_eq!(path[0], GridCoordinate::new(0, 0));
    assert!(path.contains(&GridCoordinate::new(2, 2)));
    assert_eq!(*path.last().unwrap(), GridCoordinate::new(4, 0));
}

#[test]
fn custom_path_is_anchored_at_the_endpoint_nodes() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 9, 9);
    // The drag starts and ends well away from the nodes themselves.
    let opts = RouteOptions {
        custom_path: Some(vec![GridCoordinate::new(3, 3), GridCoordinate::new(4, 4)]),
        ..Default::default()
    };
    let conn = ConnectionRouter::create_connection("c", &from, &to, &model, opts).unwrap();
    let path = conn.path.unwrap();
    assert_eq!(path[0], GridCoordinate::new(0, 0));
    assert_eq!(*path.last().unwrap(), GridCoordinate::new(9, 9));
    assert!(path.contains(&GridCoordinate::new(3, 3)));
    assert!(path.contains(&GridCoordinate::new(4, 4)));
    for w in path.windows(2) {
        assert!(w[0].is_unit_step_to(w[1]));
    }
}

#[test]
fn colliding_custom_path_is_rerouted() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 4, 0);
    // The drawn path runs straight through an occupied cell.
    activate(&mut model, 2, 0);
    let opts = RouteOptions {
        custom_path: Some(vec![
            GridCoordinate::new(0, 0),
            GridCoordinate::new(2, 0),
            GridCoordinate::new(4, 0),
        ]),
        ..Default::default()
    };
    let conn = ConnectionRouter::create_connection("c", &from, &to, &model, opts).unwrap();
    let path = conn.path.unwrap();
    assert_eq!(path[0], GridCoordinate::new(0, 0));
    assert_eq!(*path.last().unwrap(), GridCoordinate::new(4, 0));
    for w in path.windows(2) {
        assert!(w[0].is_unit_step_to(w[1]));
    }
}

#[test]
fn unreachable_target_reports_no_path() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 5, 5);
    for x in 4..=6 {
        for y in 4..=6 {
            if !(x == 5 && y == 5) {
                activate(&mut model, x, y);
            }
        }
    }
    let err = ConnectionRouter::create_connection("c", &from, &to, &model, RouteOptions::default())
        .unwrap_err();
    assert_eq!(err, RouteError::NoPath);
}

#[test]
fn degree_cap_refuses_new_connections() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 5, 5);
    model.update_node(&from, |n| n.max_connections = Some(1));

    let first =
        ConnectionRouter::create_connection("c1", &from, &to, &model, RouteOptions::default())
            .unwrap();
    model.add_connection(first);

    let err =
        ConnectionRouter::create_connection("c2", &from, &to, &model, RouteOptions::default())
            .unwrap_err();
    assert_eq!(err, RouteError::DegreeCap(from));
}

#[test]
fn occupancy_uses_stored_path_then_fallback() {
    let mut model = model_10x10();
    let from = activate(&mut model, 0, 0);
    let to = activate(&mut model, 3, 3);
    let mut conn =
        ConnectionRouter::create_connection("c", &from, &to, &model, RouteOptions::default())
            .unwrap();

    // Stored path: the routed diagonal covers (1,1).
    model.add_connection(conn.clone());
    assert!(ConnectionRouter::is_tile_occupied_by_connection(1, 1, &model));
    assert!(!ConnectionRouter::is_tile_occupied_by_connection(9, 9, &model));
    assert_eq!(ConnectionRouter::connection_at(1, 1, &model).unwrap().id, "c");

    // Without a stored path the crude x-then-y fallback answers instead,
    // and it deliberately differs from the routed geometry.
    model.remove_connection("c");
    conn.path = None;
    model.add_connection(conn);
    assert!(ConnectionRouter::is_tile_occupied_by_connection(2, 0, &model));
    assert!(!ConnectionRouter::is_tile_occupied_by_connection(1, 1, &model));
}

#[test]
fn unknown_endpoint_is_rejected() {
    let model = model_10x10();
    let err = ConnectionRouter::create_connection(
        "c",
        "missing",
        "also-missing",
        &model,
        RouteOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RouteError::UnknownNode(_)));
}
