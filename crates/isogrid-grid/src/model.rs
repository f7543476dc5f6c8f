use hashbrown::HashMap;

use crate::connection::Connection;
use crate::coord::{GridCoordinate, GridSize};
use crate::node::Node;

#[derive(Default, Debug, Clone, Copy)]
pub struct GridModelStats {
    pub nodes: usize,
    pub active_nodes: usize,
    pub connections: usize,
    pub node_revision: u64,
    pub connection_revision: u64,
}

/// Owning store for the Node/Connection collections plus simple change
/// tracking. Consumers treat the collections as an immutable snapshot for
/// the duration of one tick; revision counters tell them when derived data
/// (spatial index, instance batch) went stale.
pub struct GridModel {
    grid_size: GridSize,
    nodes: Vec<Node>,
    by_coord: HashMap<GridCoordinate, usize>,
    by_id: HashMap<String, usize>,
    connections: Vec<Connection>,
    node_revision: u64,
    connection_revision: u64,
}

impl GridModel {
    /// Build a fresh model with one inactive node per coordinate of the
    /// grid rectangle. Callers clamp absurd sizes before reaching here.
    pub fn new(grid_size: GridSize) -> Self {
        let mut m = Self {
            grid_size,
            nodes: Vec::new(),
            by_coord: HashMap::new(),
            by_id: HashMap::new(),
            connections: Vec::new(),
            node_revision: 0,
            connection_revision: 0,
        };
        m.reinit(grid_size);
        m
    }

    /// Reset to a blank rectangle of the given size. Drops all connections.
    pub fn reinit(&mut self, grid_size: GridSize) {
        self.grid_size = grid_size;
        self.nodes.clear();
        self.by_coord.clear();
        self.by_id.clear();
        self.connections.clear();
        for y in 0..grid_size.height {
            for x in 0..grid_size.width {
                let pos = GridCoordinate::new(x, y);
                let id = format!("n{}-{}", x, y);
                let idx = self.nodes.len();
                self.by_coord.insert(pos, idx);
                self.by_id.insert(id.clone(), idx);
                self.nodes.push(Node::empty(id, pos));
            }
        }
        self.node_revision += 1;
        self.connection_revision += 1;
    }

    #[inline]
    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[inline]
    pub fn node_revision(&self) -> u64 {
        self.node_revision
    }

    #[inline]
    pub fn connection_revision(&self) -> u64 {
        self.connection_revision
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_at(&self, pos: GridCoordinate) -> Option<&Node> {
        self.by_coord.get(&pos).map(|&i| &self.nodes[i])
    }

    /// Apply an edit to one node. Bumps the node revision even when the
    /// closure is a no-op; callers batch through `update_many_nodes` when
    /// that matters.
    pub fn update_node(&mut self, id: &str, f: impl FnOnce(&mut Node)) -> bool {
        let Some(&idx) = self.by_id.get(id) else {
            return false;
        };
        f(&mut self.nodes[idx]);
        self.node_revision += 1;
        true
    }

    /// Apply one edit to many nodes under a single revision bump.
    pub fn update_many_nodes<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a str>,
        f: impl Fn(&mut Node),
    ) -> usize {
        let mut touched = 0;
        for id in ids {
            if let Some(&idx) = self.by_id.get(id) {
                f(&mut self.nodes[idx]);
                touched += 1;
            }
        }
        if touched > 0 {
            self.node_revision += 1;
        }
        touched
    }

    pub fn add_connection(&mut self, conn: Connection) {
        self.connections.push(conn);
        self.connection_revision += 1;
    }

    pub fn remove_connection(&mut self, id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        if self.connections.len() != before {
            self.connection_revision += 1;
            true
        } else {
            false
        }
    }

    /// Degree of a node: connections touching it (self-loops count once).
    pub fn connection_count(&self, node_id: &str) -> usize {
        self.connections
            .iter()
            .filter(|c| c.from_id == node_id || c.to_id == node_id)
            .count()
    }

    pub fn stats(&self) -> GridModelStats {
        GridModelStats {
            nodes: self.nodes.len(),
            active_nodes: self.nodes.iter().filter(|n| n.active).count(),
            connections: self.connections.len(),
            node_revision: self.node_revision,
            connection_revision: self.connection_revision,
        }
    }
}
