//! Steering behaviours and their weighted composition.
//!
//! A behaviour is a pure function of an agent, the neighbour snapshot taken
//! at the start of the tick and the read-only [`SteeringContext`]. It returns
//! a force already clamped to the agent's limit; summing and integrating is
//! left to [`CompositeBehaviour`] and the kernel.

mod boundary;
mod composite;
mod flocking;
mod obstacle;
mod predation;

pub use boundary::{corner_force, escape_force, BoundaryAvoidance};
pub use composite::{CompositeBehaviour, WeightedBehaviour};
pub use flocking::{Alignment, Cohesion, Separation};
pub use obstacle::ObstacleAvoidance;
pub use predation::{nearest_of_variant, Hunting, PredatorAvoidance};

use crate::agent::{Agent, AgentId, Variant};
use crate::config::SimulationConfig;
use crate::spatial::Rect;
use crate::vector_math::Vector2;
use crate::world::Obstacle;

/// Snapshot of another agent as seen during the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// Identifier of the neighbour.
    pub id: AgentId,
    /// Population of the neighbour.
    pub variant: Variant,
    /// Position at the start of the tick.
    pub position: Vector2,
    /// Velocity at the start of the tick.
    pub velocity: Vector2,
    /// Distance from the observing agent.
    pub distance: f64,
}

impl Neighbour {
    /// Captures `other` as seen from `observer`.
    #[must_use]
    pub fn observe(observer: &Agent, other: &Agent) -> Self {
        Self {
            id: other.id,
            variant: other.variant(),
            position: other.position,
            velocity: other.velocity,
            distance: observer.position.distance(other.position),
        }
    }
}

/// Read-only world state available to every behaviour.
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    /// World rectangle.
    pub bounds: Rect,
    /// Static obstacles.
    pub obstacles: &'a [Obstacle],
    /// Configuration active for this tick.
    pub config: &'a SimulationConfig,
}

/// A single steering rule.
pub trait SteeringBehaviour: Send {
    /// Stable name used to address the behaviour inside a composite.
    fn name(&self) -> &'static str;

    /// Computes the steering force for `agent`.
    fn calculate(
        &self,
        agent: &Agent,
        neighbours: &[Neighbour],
        context: &SteeringContext<'_>,
    ) -> Vector2;
}
