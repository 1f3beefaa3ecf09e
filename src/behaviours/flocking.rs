//! Reynolds flocking rules: alignment, cohesion and separation.

use super::{Neighbour, SteeringBehaviour, SteeringContext};
use crate::agent::Agent;
use crate::vector_math::{Vector2, VectorExt};

/// Turns a desired heading into a steering force clamped to `max_force`.
fn steer_towards(agent: &Agent, heading: Vector2) -> Vector2 {
    if heading.is_negligible() {
        return Vector2::ZERO;
    }
    (heading.with_length(agent.max_speed) - agent.velocity).limit(agent.max_force)
}

/// Same-variant neighbours within the perception radius.
fn flockmates<'a>(
    agent: &'a Agent,
    neighbours: &'a [Neighbour],
) -> impl Iterator<Item = &'a Neighbour> + 'a {
    let variant = agent.variant();
    neighbours.iter().filter(move |n| {
        n.id != agent.id && n.variant == variant && n.distance < agent.perception_radius
    })
}

/// Average of `values`, or `None` when empty.
fn mean(values: impl Iterator<Item = Vector2>) -> Option<Vector2> {
    let (sum, count) = values.fold((Vector2::ZERO, 0_u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Steers toward the average heading of flockmates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alignment;

impl SteeringBehaviour for Alignment {
    fn name(&self) -> &'static str {
        "alignment"
    }

    fn calculate(&self, agent: &Agent, neighbours: &[Neighbour], _: &SteeringContext<'_>) -> Vector2 {
        mean(flockmates(agent, neighbours).map(|n| n.velocity))
            .map_or(Vector2::ZERO, |heading| steer_towards(agent, heading))
    }
}

/// Steers toward the centre of mass of flockmates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cohesion;

impl SteeringBehaviour for Cohesion {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn calculate(&self, agent: &Agent, neighbours: &[Neighbour], _: &SteeringContext<'_>) -> Vector2 {
        mean(flockmates(agent, neighbours).map(|n| n.position))
            .map_or(Vector2::ZERO, |centre| steer_towards(agent, centre - agent.position))
    }
}

/// Pushes away from crowding neighbours of any variant.
///
/// Each neighbour inside the separation radius contributes the unit vector
/// away from it divided by the squared distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Separation;

impl SteeringBehaviour for Separation {
    fn name(&self) -> &'static str {
        "separation"
    }

    fn calculate(
        &self,
        agent: &Agent,
        neighbours: &[Neighbour],
        context: &SteeringContext<'_>,
    ) -> Vector2 {
        let radius = context.config.separation_radius;
        let repulsion = mean(
            neighbours
                .iter()
                .filter(|n| n.id != agent.id && n.distance > 0.0 && n.distance < radius)
                .map(|n| (agent.position - n.position).normalized() / (n.distance * n.distance)),
        );
        repulsion.map_or(Vector2::ZERO, |push| steer_towards(agent, push))
    }
}
