//! Properties of individual steering behaviours and their composition.
use boidworld::behaviours::{
    Alignment, BoundaryAvoidance, Cohesion, CompositeBehaviour, Neighbour, Separation,
    SteeringBehaviour, SteeringContext,
};
use boidworld::{Agent, Rect, SimulationConfig, Variant, Vector2};
use rstest::{fixture, rstest};
use test_utils::{predator_at, prey_at, ring_of};

#[fixture]
fn config() -> SimulationConfig {
    SimulationConfig {
        boundary_margin: 100.0,
        ..SimulationConfig::default()
    }
}

fn steer(
    behaviour: &dyn SteeringBehaviour,
    agent: &Agent,
    others: &[Agent],
    config: &SimulationConfig,
) -> Vector2 {
    let context = SteeringContext {
        bounds: Rect::from_size(800.0, 600.0).expect("valid bounds"),
        obstacles: &[],
        config,
    };
    let neighbours: Vec<Neighbour> = others.iter().map(|o| Neighbour::observe(agent, o)).collect();
    behaviour.calculate(agent, &neighbours, &context)
}

#[rstest]
#[case::alignment(&Alignment)]
#[case::cohesion(&Cohesion)]
fn flocking_ignores_other_variants(config: SimulationConfig, #[case] behaviour: &dyn SteeringBehaviour) {
    let me = prey_at(1, 400.0, 300.0).with_velocity(Vector2::new(1.0, 1.0));
    assert_eq!(steer(behaviour, &me, &[], &config), Vector2::ZERO);
    let hunters = [predator_at(2, 410.0, 300.0), predator_at(3, 395.0, 310.0)];
    assert_eq!(steer(behaviour, &me, &hunters, &config), Vector2::ZERO);
}

#[rstest]
fn cornered_agents_push_back_inside(config: SimulationConfig) {
    let me = prey_at(1, 10.0, 10.0).with_velocity(Vector2::new(1.0, 1.0));
    let force = steer(&BoundaryAvoidance, &me, &[], &config);
    assert!(force.x > 0.0 && force.y > 0.0, "{force:?}");
}

#[rstest]
fn world_centre_feels_no_boundary(config: SimulationConfig) {
    let me = prey_at(1, 400.0, 300.0).with_velocity(Vector2::new(1.0, 1.0));
    assert_eq!(steer(&BoundaryAvoidance, &me, &[], &config), Vector2::ZERO);
}

#[rstest]
fn balanced_ring_cancels_separation(config: SimulationConfig) {
    let centre = Vector2::new(400.0, 300.0);
    let me = prey_at(100, centre.x, centre.y);
    let ring = ring_of(Variant::Prey, centre, 10.0, 8, 1);
    let force = steer(&Separation, &me, &ring, &config);
    assert!(force.length() < 1e-4, "{force:?}");
}

#[rstest]
fn composite_sum_is_not_reclamped(config: SimulationConfig) {
    let me = prey_at(1, 10.0, 300.0);
    let hunter = predator_at(2, 30.0, 300.0);
    let context = SteeringContext {
        bounds: Rect::from_size(800.0, 600.0).expect("valid bounds"),
        obstacles: &[],
        config: &config,
    };
    let composite = CompositeBehaviour::from_config(&config);
    let force = composite.calculate(&me, &[Neighbour::observe(&me, &hunter)], &context);
    // Evasion and separation both push west and outweigh the wall.
    assert!(force.x < 0.0);
    assert!(force.length() > me.max_force, "{force:?}");
}
