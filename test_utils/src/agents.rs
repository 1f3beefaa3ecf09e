//! Agent builders with default movement limits.

use boidworld::agent::{Agent, AgentId, MovementLimits, Role, Sex, Variant};
use boidworld::vector_math::Vector2;

/// Builds an agent at rest.
///
/// # Examples
/// ```
/// use boidworld::agent::{Sex, Variant};
/// use test_utils::agent_at;
/// let boid = agent_at(3, Variant::Predator, Sex::Male, 1.0, 2.0);
/// assert_eq!(boid.id.into_inner(), 3);
/// assert!(boid.attack().is_some());
/// ```
#[must_use]
pub fn agent_at(id: u64, variant: Variant, sex: Sex, x: f64, y: f64) -> Agent {
    Agent::new(
        AgentId(id),
        Role::for_variant(variant),
        sex,
        Vector2::new(x, y),
        MovementLimits::default(),
    )
}

/// Female prey at rest.
#[must_use]
pub fn prey_at(id: u64, x: f64, y: f64) -> Agent {
    agent_at(id, Variant::Prey, Sex::Female, x, y)
}

/// Male predator at rest.
#[must_use]
pub fn predator_at(id: u64, x: f64, y: f64) -> Agent {
    agent_at(id, Variant::Predator, Sex::Male, x, y)
}

/// `count` agents evenly spaced on a circle, ids starting at `first_id`.
#[must_use]
pub fn ring_of(variant: Variant, centre: Vector2, radius: f64, count: u32, first_id: u64) -> Vec<Agent> {
    (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * f64::from(i) / f64::from(count);
            let position = centre + Vector2::from_angle(angle) * radius;
            agent_at(first_id + u64::from(i), variant, Sex::Female, position.x, position.y)
        })
        .collect()
}
