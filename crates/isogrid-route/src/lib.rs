//! Connection routing: A* grid pathfinding with obstacle avoidance, path
//! densification and validation, self-loop synthesis, and waypoint
//! re-routing.
#![forbid(unsafe_code)]

mod astar;
mod router;

pub use astar::{ObstacleSet, SQRT_2, find_path, octile_heuristic};
pub use router::{ConnectionRouter, RouteError, RouteOptions, densify_path, self_loop_path};
