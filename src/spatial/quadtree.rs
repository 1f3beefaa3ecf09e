//! Point quadtree with soft overflow at maximum depth.

use log::trace;

use super::{IndexEntry, IndexError, Rect, SpatialIndex};
use crate::agent::AgentId;
use crate::vector_math::Vector2;
use crate::{QUADTREE_CAPACITY, QUADTREE_MAX_DEPTH};

#[derive(Debug)]
struct QuadNode {
    bounds: Rect,
    depth: usize,
    entries: Vec<IndexEntry>,
    /// NW, NE, SW, SE.
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    const fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }

    /// Child slot for `point`; split lines belong to the east/south side.
    fn quadrant(&self, point: Vector2) -> usize {
        let mid = self.bounds.center();
        usize::from(point.x >= mid.x) + 2 * usize::from(point.y >= mid.y)
    }

    fn insert(&mut self, entry: IndexEntry, capacity: usize, max_depth: usize) {
        if self.children.is_none() {
            if self.entries.len() < capacity || self.depth >= max_depth {
                self.entries.push(entry);
                return;
            }
            self.subdivide(capacity, max_depth);
        }
        let slot = self.quadrant(entry.position);
        if let Some(child) = self.children.as_mut().and_then(|c| c.get_mut(slot)) {
            child.insert(entry, capacity, max_depth);
        }
    }

    fn subdivide(&mut self, capacity: usize, max_depth: usize) {
        let Rect { min, max } = self.bounds;
        let mid = self.bounds.center();
        let depth = self.depth + 1;
        let quad = |lo: Vector2, hi: Vector2| QuadNode::new(Rect { min: lo, max: hi }, depth);
        self.children = Some(Box::new([
            quad(min, mid),
            quad(Vector2::new(mid.x, min.y), Vector2::new(max.x, mid.y)),
            quad(Vector2::new(min.x, mid.y), Vector2::new(mid.x, max.y)),
            quad(mid, max),
        ]));
        trace!("quadtree node split at depth {}", self.depth);
        for entry in std::mem::take(&mut self.entries) {
            let slot = self.quadrant(entry.position);
            if let Some(child) = self.children.as_mut().and_then(|c| c.get_mut(slot)) {
                child.insert(entry, capacity, max_depth);
            }
        }
    }

    fn visit(&self, point: Vector2, radius: f64, visitor: &mut dyn FnMut(&IndexEntry)) {
        if !self.bounds.intersects_circle(point, radius) {
            return;
        }
        self.entries
            .iter()
            .filter(|entry| entry.position.distance(point) < radius)
            .for_each(|entry| visitor(entry));
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.visit(point, radius, visitor);
            }
        }
    }

    fn max_depth(&self) -> usize {
        self.children.as_ref().map_or(self.depth, |children| {
            children.iter().map(Self::max_depth).max().unwrap_or(self.depth)
        })
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(Self::node_count).sum())
    }
}

/// Quadtree over the world rectangle.
///
/// Leaves split into four equal quadrants once they hold `capacity` points,
/// unless they already sit at `max_depth`; such leaves keep accepting points.
///
/// # Examples
/// ```
/// use boidworld::agent::AgentId;
/// use boidworld::spatial::{Quadtree, SpatialIndex};
/// use boidworld::vector_math::Vector2;
///
/// let mut tree = Quadtree::new(800.0, 600.0)?;
/// assert!(tree.insert(AgentId(1), Vector2::new(10.0, 10.0)));
/// assert!(!tree.insert(AgentId(2), Vector2::new(-1.0, 10.0)));
/// assert_eq!(tree.query(Vector2::new(12.0, 10.0), 5.0).len(), 1);
/// # Ok::<(), boidworld::spatial::IndexError>(())
/// ```
#[derive(Debug)]
pub struct Quadtree {
    root: QuadNode,
    capacity: usize,
    max_depth: usize,
    len: usize,
}

impl Quadtree {
    /// Creates a tree with the default capacity and depth.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidBounds`] for non-positive dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, IndexError> {
        Self::with_limits(width, height, QUADTREE_CAPACITY, QUADTREE_MAX_DEPTH)
    }

    /// Creates a tree with explicit leaf capacity and depth limit.
    ///
    /// A capacity of zero is treated as one.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidBounds`] for non-positive dimensions.
    pub fn with_limits(
        width: f64,
        height: f64,
        capacity: usize,
        max_depth: usize,
    ) -> Result<Self, IndexError> {
        Ok(Self {
            root: QuadNode::new(Rect::from_size(width, height)?, 0),
            capacity: capacity.max(1),
            max_depth,
            len: 0,
        })
    }

    /// Deepest level currently in use; the root is depth zero.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Number of nodes, leaves included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

impl SpatialIndex for Quadtree {
    fn insert(&mut self, id: AgentId, position: Vector2) -> bool {
        if !position.is_finite() || !self.root.bounds.contains(position) {
            trace!("{id} at {position} is outside the index bounds; skipped");
            return false;
        }
        self.root
            .insert(IndexEntry { id, position }, self.capacity, self.max_depth);
        self.len += 1;
        true
    }

    fn for_each_within(&self, point: Vector2, radius: f64, visitor: &mut dyn FnMut(&IndexEntry)) {
        if !point.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return;
        }
        self.root.visit(point, radius, visitor);
    }

    fn clear(&mut self) {
        self.root = QuadNode::new(self.root.bounds, 0);
        self.len = 0;
    }

    fn update_bounds(&mut self, width: f64, height: f64) -> Result<(), IndexError> {
        self.root = QuadNode::new(Rect::from_size(width, height)?, 0);
        self.len = 0;
        Ok(())
    }

    fn bounds(&self) -> Rect {
        self.root.bounds
    }

    fn len(&self) -> usize {
        self.len
    }
}
