//! Avoidance of static circular obstacles.

use super::{Neighbour, SteeringBehaviour, SteeringContext};
use crate::agent::Agent;
use crate::vector_math::{Vector2, VectorExt};

/// Pushes agents away from obstacles whose surface is within reach.
///
/// The push grows linearly from zero at `obstacle_perception_radius` from
/// the surface to full strength at contact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObstacleAvoidance;

impl SteeringBehaviour for ObstacleAvoidance {
    fn name(&self) -> &'static str {
        "obstacle"
    }

    fn calculate(&self, agent: &Agent, _: &[Neighbour], context: &SteeringContext<'_>) -> Vector2 {
        let reach = context.config.obstacle_perception_radius;
        let strength = context.config.obstacle_force_multiplier * agent.max_speed;
        context
            .obstacles
            .iter()
            .filter_map(|obstacle| {
                let gap = obstacle.surface_distance(agent.position).max(0.0);
                (gap < reach).then(|| {
                    (agent.position - obstacle.position).normalized() * (1.0 - gap / reach) * strength
                })
            })
            .fold(Vector2::ZERO, |total, push| total + push)
            .limit(agent.max_force)
    }
}
