//! Spatial indexing for per-tick neighbour queries.
//!
//! The kernel owns exactly one [`SpatialIndex`] and rebuilds it from the live
//! flock at the start of every tick, so implementations never need to support
//! removal or in-place moves.

mod quadtree;

pub use quadtree::Quadtree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{Agent, AgentId};
use crate::vector_math::Vector2;

/// Errors emitted by spatial index implementations.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// World dimensions that cannot hold any point.
    #[error("invalid bounds {width}x{height}: dimensions must be positive and finite")]
    InvalidBounds {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}

/// Axis-aligned rectangle; every edge is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub min: Vector2,
    /// Bottom-right corner.
    pub max: Vector2,
}

impl Rect {
    /// Rectangle anchored at the origin.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidBounds`] unless both dimensions are
    /// positive and finite.
    pub fn from_size(width: f64, height: f64) -> Result<Self, IndexError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(IndexError::InvalidBounds { width, height });
        }
        Ok(Self {
            min: Vector2::ZERO,
            max: Vector2::new(width, height),
        })
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Whether `point` lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Whether a circle could contain a point of this rectangle.
    #[must_use]
    pub fn intersects_circle(&self, center: Vector2, radius: f64) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// Position snapshot stored in an index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    /// Agent the position belongs to.
    pub id: AgentId,
    /// Position at rebuild time.
    pub position: Vector2,
}

/// Common behaviour exposed by neighbourhood indices.
pub trait SpatialIndex: Send {
    /// Stores a position; returns `false` when it lies outside the bounds.
    fn insert(&mut self, id: AgentId, position: Vector2) -> bool;

    /// Visits every entry strictly closer than `radius` to `point`.
    fn for_each_within(&self, point: Vector2, radius: f64, visitor: &mut dyn FnMut(&IndexEntry));

    /// Removes every entry, keeping the bounds.
    fn clear(&mut self);

    /// Recreates the index over a `width` by `height` world.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidBounds`] for non-positive dimensions and
    /// leaves the current bounds in place.
    fn update_bounds(&mut self, width: f64, height: f64) -> Result<(), IndexError>;

    /// Current root bounds.
    fn bounds(&self) -> Rect;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects every entry strictly closer than `radius` to `point`.
    fn query(&self, point: Vector2, radius: f64) -> Vec<IndexEntry> {
        let mut found = Vec::new();
        self.for_each_within(point, radius, &mut |entry| found.push(*entry));
        found
    }

    /// Clears the index and inserts every agent; returns how many fit.
    fn rebuild(&mut self, agents: &[Agent]) -> usize {
        self.clear();
        agents
            .iter()
            .filter(|agent| self.insert(agent.id, agent.position))
            .count()
    }
}
