//! Point quadtree over grid coordinates, used for rectangular bounds
//! queries and culling. The index is rebuilt from scratch whenever the node
//! set changes; consumers must not assume incremental consistency.
#![forbid(unsafe_code)]

/// Max points a leaf holds before it subdivides.
const NODE_CAPACITY: usize = 4;

/// Inclusive axis-aligned query/boundary rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Region {
    #[inline]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    #[inline]
    pub fn intersects(&self, other: &Region) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

/// An indexed point: grid coordinate plus the caller's slot (e.g. index
/// into the node slice).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadPoint {
    pub x: f32,
    pub y: f32,
    pub slot: usize,
}

struct QuadNode {
    boundary: Region,
    points: Vec<QuadPoint>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(boundary: Region) -> Self {
        Self {
            boundary,
            points: Vec::with_capacity(NODE_CAPACITY),
            children: None,
        }
    }

    fn subdivide(&mut self) {
        let b = self.boundary;
        let mx = (b.min_x + b.max_x) * 0.5;
        let my = (b.min_y + b.max_y) * 0.5;
        self.children = Some(Box::new([
            QuadNode::new(Region::new(b.min_x, b.min_y, mx, my)),
            QuadNode::new(Region::new(mx, b.min_y, b.max_x, my)),
            QuadNode::new(Region::new(b.min_x, my, mx, b.max_y)),
            QuadNode::new(Region::new(mx, my, b.max_x, b.max_y)),
        ]));
    }

    fn insert(&mut self, p: QuadPoint) -> bool {
        if !self.boundary.contains(p.x, p.y) {
            return false;
        }
        if self.children.is_none() {
            if self.points.len() < NODE_CAPACITY {
                self.points.push(p);
                return true;
            }
            self.subdivide();
        }
        // Quadrant boundaries overlap on shared edges; descending into the
        // first child that accepts keeps every point stored exactly once.
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.insert(p) {
                    return true;
                }
            }
        }
        // Points already resident stay where they are; only the overflow
        // descends. Degenerate boundaries can refuse subdivision targets.
        self.points.push(p);
        true
    }

    fn query_into(&self, range: &Region, out: &mut Vec<QuadPoint>) {
        if !self.boundary.intersects(range) {
            return;
        }
        for p in &self.points {
            if range.contains(p.x, p.y) {
                out.push(*p);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_into(range, out);
            }
        }
    }
}

/// Quadtree with a fixed world-space boundary covering the addressable
/// coordinate range.
pub struct SpatialIndex {
    root: QuadNode,
    len: usize,
}

impl SpatialIndex {
    pub fn new(boundary: Region) -> Self {
        Self {
            root: QuadNode::new(boundary),
            len: 0,
        }
    }

    #[inline]
    pub fn boundary(&self) -> Region {
        self.root.boundary
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert one point. Returns false (and stores nothing) when the point
    /// lies outside the fixed boundary.
    pub fn insert(&mut self, x: f32, y: f32, slot: usize) -> bool {
        let ok = self.root.insert(QuadPoint { x, y, slot });
        if ok {
            self.len += 1;
        }
        ok
    }

    /// All indexed points whose coordinates fall within `range`, pruning
    /// subtrees that cannot intersect it.
    pub fn query(&self, range: &Region) -> Vec<QuadPoint> {
        let mut out = Vec::new();
        self.root.query_into(range, &mut out);
        out
    }

    /// Reset to a single empty node, keeping the boundary.
    pub fn clear(&mut self) {
        self.root = QuadNode::new(self.root.boundary);
        self.len = 0;
    }
}
