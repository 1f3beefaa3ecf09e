//! Keeping agents inside a collidable world.
//!
//! Wrappable worlds need no steering: the kernel teleports agents after
//! integration. Collidable worlds push agents back from each edge they come
//! within `boundary_margin` of, with a single stronger push toward the world
//! centre when two perpendicular edges are close at once.

use super::{Neighbour, SteeringBehaviour, SteeringContext};
use crate::agent::Agent;
use crate::spatial::Rect;
use crate::vector_math::{Vector2, VectorExt};
use crate::world::{BoundaryMode, BoundarySide};
use crate::{CORNER_FORCE_FACTOR, ESCAPE_FORCE_FACTOR, ESCAPE_LATERAL_THRESHOLD};

const SIDES: [BoundarySide; 4] = [
    BoundarySide::Left,
    BoundarySide::Right,
    BoundarySide::Top,
    BoundarySide::Bottom,
];

/// Push toward the world centre used when an agent is caught in a corner.
#[must_use]
pub fn corner_force(agent: &Agent, bounds: &Rect) -> Vector2 {
    (bounds.center() - agent.position).with_length(CORNER_FORCE_FACTOR * agent.max_speed)
}

/// One-off impulse freeing an agent pinned against `side`.
///
/// The impulse points away from the edge and slides along it, following the
/// agent's lateral velocity when it has one and the world centre otherwise.
#[must_use]
pub fn escape_force(agent: &Agent, side: BoundarySide, bounds: &Rect) -> Vector2 {
    let (lateral_speed, towards_centre) = if side.is_vertical() {
        (agent.velocity.y, bounds.center().y - agent.position.y)
    } else {
        (agent.velocity.x, bounds.center().x - agent.position.x)
    };
    let slide = if lateral_speed.abs() > ESCAPE_LATERAL_THRESHOLD {
        lateral_speed.signum()
    } else if towards_centre < 0.0 {
        -1.0
    } else {
        1.0
    };
    let lateral = if side.is_vertical() {
        Vector2::new(0.0, slide)
    } else {
        Vector2::new(slide, 0.0)
    };
    (side.inward_normal() + lateral).with_length(ESCAPE_FORCE_FACTOR * agent.max_speed)
}

/// Steers agents away from the edges of a collidable world.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryAvoidance;

impl SteeringBehaviour for BoundaryAvoidance {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn calculate(&self, agent: &Agent, _: &[Neighbour], context: &SteeringContext<'_>) -> Vector2 {
        let config = context.config;
        if config.boundary_mode == BoundaryMode::Wrappable {
            return Vector2::ZERO;
        }
        let margin = config.boundary_margin;
        let near: Vec<(BoundarySide, f64)> = SIDES
            .into_iter()
            .map(|side| (side, side.distance(&context.bounds, agent.position).max(0.0)))
            .filter(|&(_, distance)| distance < margin)
            .collect();

        let near_vertical = near.iter().any(|(side, _)| side.is_vertical());
        let near_horizontal = near.iter().any(|(side, _)| !side.is_vertical());
        if near_vertical && near_horizontal {
            return corner_force(agent, &context.bounds).limit(agent.max_force);
        }

        near.into_iter()
            .map(|(side, distance)| {
                let strength = (1.0 - distance / margin).powf(config.boundary_force_ramp)
                    * config.boundary_force_multiplier
                    * agent.max_speed;
                side.inward_normal() * strength
            })
            .fold(Vector2::ZERO, |total, push| total + push)
            .limit(agent.max_force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, MovementLimits, Role, Sex};
    use crate::config::SimulationConfig;
    use rstest::{fixture, rstest};

    #[fixture]
    fn bounds() -> Rect {
        Rect::from_size(800.0, 600.0).expect("valid bounds")
    }

    fn boid(position: Vector2, velocity: Vector2) -> Agent {
        Agent::new(AgentId(1), Role::Prey, Sex::Female, position, MovementLimits::default())
            .with_velocity(velocity)
    }

    fn force(agent: &Agent, bounds: Rect, config: &SimulationConfig) -> Vector2 {
        let context = SteeringContext {
            bounds,
            obstacles: &[],
            config,
        };
        BoundaryAvoidance.calculate(agent, &[], &context)
    }

    fn config_with_margin(margin: f64) -> SimulationConfig {
        SimulationConfig {
            boundary_margin: margin,
            ..SimulationConfig::default()
        }
    }

    #[rstest]
    fn corner_pushes_toward_centre(bounds: Rect) {
        let agent = boid(Vector2::new(10.0, 10.0), Vector2::new(1.0, 1.0));
        let push = force(&agent, bounds, &config_with_margin(100.0));
        assert!(push.x > 0.0 && push.y > 0.0, "{push:?}");
        assert!(push.length() <= agent.max_force + 1e-12);
    }

    #[rstest]
    fn centre_of_world_feels_nothing(bounds: Rect) {
        let agent = boid(bounds.center(), Vector2::new(2.0, 0.0));
        assert_eq!(force(&agent, bounds, &config_with_margin(100.0)), Vector2::ZERO);
    }

    #[rstest]
    fn single_edge_pushes_along_its_normal(bounds: Rect) {
        let agent = boid(Vector2::new(400.0, 590.0), Vector2::ZERO);
        let push = force(&agent, bounds, &config_with_margin(50.0));
        assert!(push.x.abs() < 1e-12);
        assert!(push.y < 0.0);
    }

    #[rstest]
    fn wrappable_worlds_apply_no_force(bounds: Rect) {
        let config = SimulationConfig {
            boundary_mode: BoundaryMode::Wrappable,
            ..config_with_margin(100.0)
        };
        let agent = boid(Vector2::new(1.0, 1.0), Vector2::ZERO);
        assert_eq!(force(&agent, bounds, &config), Vector2::ZERO);
    }

    #[rstest]
    fn ramp_weakens_force_away_from_edge(bounds: Rect) {
        let config = SimulationConfig {
            max_force: 100.0,
            ..config_with_margin(100.0)
        };
        let mut close = boid(Vector2::new(10.0, 300.0), Vector2::ZERO);
        let mut far = boid(Vector2::new(60.0, 300.0), Vector2::ZERO);
        close.max_force = config.max_force;
        far.max_force = config.max_force;
        let strong = force(&close, bounds, &config);
        let weak = force(&far, bounds, &config);
        // (1 - 0.1)^2 * 4 and (1 - 0.6)^2 * 4
        assert!((strong.x - 3.24).abs() < 1e-9);
        assert!((weak.x - 0.64).abs() < 1e-9);
    }

    #[rstest]
    fn escape_follows_lateral_velocity(bounds: Rect) {
        let sliding_up = boid(Vector2::new(0.0, 300.0), Vector2::new(0.0, -1.0));
        let push = escape_force(&sliding_up, BoundarySide::Left, &bounds);
        assert!(push.x > 0.0 && push.y < 0.0);
        assert!((push.length() - 2.0 * sliding_up.max_speed).abs() < 1e-9);
    }

    #[rstest]
    fn escape_without_lateral_motion_heads_to_centre(bounds: Rect) {
        let resting = boid(Vector2::new(400.0, 600.0), Vector2::ZERO);
        let push = escape_force(&resting, BoundarySide::Bottom, &bounds);
        assert!(push.y < 0.0);
        assert!(push.x > 0.0);
    }
}
