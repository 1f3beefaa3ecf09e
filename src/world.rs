//! World geometry shared by behaviours and the kernel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::Rect;
use crate::vector_math::Vector2;

/// How the world edge treats agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryMode {
    /// Agents leaving one edge re-enter at the opposite one.
    Wrappable,
    /// Agents are steered away from and clamped to the edge.
    Collidable,
}

/// One edge of the world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundarySide {
    /// `x == min.x`.
    Left,
    /// `x == max.x`.
    Right,
    /// `y == min.y`.
    Top,
    /// `y == max.y`.
    Bottom,
}

impl BoundarySide {
    /// Unit vector pointing from this edge into the world.
    #[must_use]
    pub const fn inward_normal(self) -> Vector2 {
        match self {
            Self::Left => Vector2::new(1.0, 0.0),
            Self::Right => Vector2::new(-1.0, 0.0),
            Self::Top => Vector2::new(0.0, 1.0),
            Self::Bottom => Vector2::new(0.0, -1.0),
        }
    }

    /// Whether the edge runs vertically.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Distance from `position` to this edge of `bounds`.
    #[must_use]
    pub fn distance(self, bounds: &Rect, position: Vector2) -> f64 {
        match self {
            Self::Left => position.x - bounds.min.x,
            Self::Right => bounds.max.x - position.x,
            Self::Top => position.y - bounds.min.y,
            Self::Bottom => bounds.max.y - position.y,
        }
    }

    /// The edge closest to `position` when it lies within `margin`.
    #[must_use]
    pub fn nearest_within(bounds: &Rect, position: Vector2, margin: f64) -> Option<Self> {
        [Self::Left, Self::Right, Self::Top, Self::Bottom]
            .into_iter()
            .map(|side| (side, side.distance(bounds, position)))
            .filter(|&(_, distance)| distance < margin)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(side, _)| side)
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Circular obstacle; read-only to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Centre of the obstacle.
    pub position: Vector2,
    /// Radius of the obstacle.
    pub radius: f64,
}

impl Obstacle {
    /// Creates an obstacle.
    #[must_use]
    pub const fn new(position: Vector2, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Distance from `point` to the obstacle surface; negative inside.
    #[must_use]
    pub fn surface_distance(&self, point: Vector2) -> f64 {
        self.position.distance(point) - self.radius
    }
}
