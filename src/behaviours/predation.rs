//! Predator-prey steering: prey evasion and predator pursuit.

use ordered_float::OrderedFloat;

use super::{Neighbour, SteeringBehaviour, SteeringContext};
use crate::agent::{Agent, Variant};
use crate::vector_math::{Vector2, VectorExt};
use crate::{
    EVASION_FORCE_FACTOR, EVASION_RADIUS_FACTOR, EVASION_SPEED_FACTOR, HUNTING_FORCE_FACTOR,
    HUNTING_RADIUS_FACTOR, HUNTING_SPEED_FACTOR, VECTOR_EPSILON,
};

/// Closest neighbour of `variant` strictly within `range`.
#[must_use]
pub fn nearest_of_variant(
    neighbours: &[Neighbour],
    variant: Variant,
    range: f64,
) -> Option<&Neighbour> {
    neighbours
        .iter()
        .filter(|n| n.variant == variant && n.distance < range)
        .min_by_key(|n| OrderedFloat(n.distance))
}

/// Prey flee every predator within 1.5 × their perception radius.
///
/// Closer predators weigh more: each contributes the unit vector away from
/// it divided by its distance as a fraction of the detection range.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredatorAvoidance;

impl SteeringBehaviour for PredatorAvoidance {
    fn name(&self) -> &'static str {
        "predator-avoidance"
    }

    fn calculate(&self, agent: &Agent, neighbours: &[Neighbour], _: &SteeringContext<'_>) -> Vector2 {
        match agent.variant() {
            Variant::Predator => Vector2::ZERO,
            Variant::Prey => {
                let range = EVASION_RADIUS_FACTOR * agent.perception_radius;
                let flee = neighbours
                    .iter()
                    .filter(|n| n.variant == Variant::Predator && n.distance < range)
                    .map(|n| {
                        let closeness = (n.distance / range).max(VECTOR_EPSILON);
                        (agent.position - n.position).normalized() / closeness
                    })
                    .fold(Vector2::ZERO, |total, push| total + push);
                if flee.is_negligible() {
                    return Vector2::ZERO;
                }
                (flee.with_length(EVASION_SPEED_FACTOR * agent.max_speed) - agent.velocity)
                    .limit(EVASION_FORCE_FACTOR * agent.max_force)
            }
        }
    }
}

/// Predators chase the nearest prey within 2 × their perception radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hunting;

impl SteeringBehaviour for Hunting {
    fn name(&self) -> &'static str {
        "hunting"
    }

    fn calculate(&self, agent: &Agent, neighbours: &[Neighbour], _: &SteeringContext<'_>) -> Vector2 {
        match agent.variant() {
            Variant::Prey => Vector2::ZERO,
            Variant::Predator => {
                let range = HUNTING_RADIUS_FACTOR * agent.perception_radius;
                nearest_of_variant(neighbours, Variant::Prey, range).map_or(Vector2::ZERO, |prey| {
                    let chase = (prey.position - agent.position)
                        .with_length(HUNTING_SPEED_FACTOR * agent.max_speed);
                    if chase.is_negligible() {
                        return Vector2::ZERO;
                    }
                    (chase - agent.velocity).limit(HUNTING_FORCE_FACTOR * agent.max_force)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, MovementLimits, Role, Sex};
    use crate::config::SimulationConfig;
    use crate::spatial::Rect;
    use rstest::rstest;

    fn boid(id: u64, variant: Variant, x: f64, y: f64) -> Agent {
        Agent::new(
            AgentId(id),
            Role::for_variant(variant),
            Sex::Female,
            Vector2::new(x, y),
            MovementLimits::default(),
        )
    }

    fn steer(behaviour: &dyn SteeringBehaviour, agent: &Agent, others: &[Agent]) -> Vector2 {
        let config = SimulationConfig::default();
        let context = SteeringContext {
            bounds: Rect::from_size(800.0, 600.0).expect("valid bounds"),
            obstacles: &[],
            config: &config,
        };
        let seen: Vec<Neighbour> = others.iter().map(|o| Neighbour::observe(agent, o)).collect();
        behaviour.calculate(agent, &seen, &context)
    }

    #[rstest]
    fn prey_flee_nearby_predators() {
        let prey = boid(1, Variant::Prey, 100.0, 100.0);
        let hunter = boid(2, Variant::Predator, 130.0, 100.0);
        let push = steer(&PredatorAvoidance, &prey, &[hunter]);
        assert!(push.x < 0.0);
        assert!(push.length() <= 3.0 * prey.max_force + 1e-12);
        assert!(push.length() > prey.max_force);
    }

    #[rstest]
    fn predators_outside_detection_range_are_ignored() {
        let prey = boid(1, Variant::Prey, 100.0, 100.0);
        // 1.5 × 50 = 75
        let hunter = boid(2, Variant::Predator, 176.0, 100.0);
        assert_eq!(steer(&PredatorAvoidance, &prey, &[hunter]), Vector2::ZERO);
    }

    #[rstest]
    fn predators_do_not_flee() {
        let hunter = boid(1, Variant::Predator, 100.0, 100.0);
        let rival = boid(2, Variant::Predator, 110.0, 100.0);
        assert_eq!(steer(&PredatorAvoidance, &hunter, &[rival]), Vector2::ZERO);
    }

    #[rstest]
    fn hunters_chase_the_nearest_prey() {
        let hunter = boid(1, Variant::Predator, 100.0, 100.0);
        let far = boid(2, Variant::Prey, 100.0, 180.0);
        let near = boid(3, Variant::Prey, 60.0, 100.0);
        let pull = steer(&Hunting, &hunter, &[far, near]);
        assert!(pull.x < 0.0);
        assert!(pull.y.abs() < 1e-12);
        assert!((pull.length() - 1.5 * hunter.max_force).abs() < 1e-9);
    }

    #[rstest]
    fn prey_do_not_hunt() {
        let prey = boid(1, Variant::Prey, 100.0, 100.0);
        let other = boid(2, Variant::Prey, 110.0, 100.0);
        assert_eq!(steer(&Hunting, &prey, &[other]), Vector2::ZERO);
    }
}
