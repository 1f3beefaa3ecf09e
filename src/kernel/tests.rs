use super::*;
use crate::agent::{MovementLimits, Role, Sex};
use crate::config::ConfigPatch;
use crate::events::EventBuffer;
use crate::world::BoundaryMode;
use rstest::{fixture, rstest};

type Kernel = SimulationKernel<EventBuffer>;

#[fixture]
fn kernel() -> Kernel {
    SimulationKernel::new(800.0, 600.0, SimulationConfig::default(), EventBuffer::new())
        .expect("valid world")
}

fn boid(id: u64, variant: Variant, sex: Sex, x: f64, y: f64) -> Agent {
    Agent::new(
        AgentId(id),
        Role::for_variant(variant),
        sex,
        Vector2::new(x, y),
        MovementLimits::default(),
    )
}

/// Factory that always hands out the same id.
struct FixedIdFactory;

impl AgentFactory for FixedIdFactory {
    fn create(&mut self, variant: Variant, position: Vector2, velocity: Vector2) -> Agent {
        boid(1, variant, Sex::Female, position.x, position.y).with_velocity(velocity)
    }

    fn recycle(&mut self, _agent: Agent) {}

    fn set_limits(&mut self, _limits: MovementLimits) {}
}

fn kinds(kernel: &Kernel) -> Vec<&'static str> {
    kernel.sink().events().iter().map(SimEvent::kind).collect()
}

#[rstest]
#[case(0.0, 600.0)]
#[case(800.0, -1.0)]
#[case(f64::NAN, 600.0)]
fn rejects_degenerate_worlds(#[case] width: f64, #[case] height: f64) {
    let result = SimulationKernel::new(width, height, SimulationConfig::default(), EventBuffer::new());
    assert!(matches!(result, Err(KernelError::InvalidBounds(_))));
}

#[rstest]
fn rejects_invalid_initial_config() {
    let config = SimulationConfig {
        perception_radius: 0.0,
        ..SimulationConfig::default()
    };
    let result = SimulationKernel::new(800.0, 600.0, config, EventBuffer::new());
    assert!(matches!(result, Err(KernelError::InvalidConfig(_))));
}

#[rstest]
#[case(0.0)]
#[case(-16.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn degenerate_steps_do_nothing(mut kernel: Kernel, #[case] dt: f64) {
    let id = kernel
        .spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::new(2.0, 0.0))
        .expect("spawned");
    assert_eq!(kernel.tick(dt), TickSummary::default());
    assert_eq!(kernel.agent(id).map(|a| a.position), Some(Vector2::new(400.0, 300.0)));
    assert!(kernel.elapsed_ms().abs() < f64::EPSILON);
}

#[rstest]
fn duplicate_ids_are_refused(mut kernel: Kernel) {
    let id = kernel
        .spawn(Variant::Prey, Vector2::new(10.0, 10.0), Vector2::ZERO)
        .expect("spawned");
    let copy = kernel.agent(id).cloned().expect("registered");
    assert!(!kernel.add_agent(copy));
    assert_eq!(kernel.len(), 1);
}

#[rstest]
fn removal_reports_and_returns_the_agent(mut kernel: Kernel) {
    let id = kernel
        .spawn(Variant::Predator, Vector2::new(10.0, 10.0), Vector2::ZERO)
        .expect("spawned");
    let removed = kernel.remove_agent(id).expect("registered");
    assert_eq!(removed.id, id);
    assert!(kernel.is_empty());
    assert!(kernel.remove_agent(id).is_none());
    assert_eq!(kinds(&kernel), vec!["boid-removed"]);
}

#[rstest]
fn config_changes_wait_for_the_next_tick(mut kernel: Kernel) {
    let id = kernel
        .spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    let patch = ConfigPatch {
        max_speed: Some(2.0),
        separation_weight: Some(3.0),
        ..ConfigPatch::default()
    };
    kernel.apply_config(&patch).expect("valid patch");
    assert!((kernel.config().max_speed - 4.0).abs() < f64::EPSILON);
    assert!(kernel.pending_config().is_some());

    kernel.tick(16.0);
    assert!((kernel.config().max_speed - 2.0).abs() < f64::EPSILON);
    assert!(kernel.pending_config().is_none());
    assert!(kernel
        .agent(id)
        .is_some_and(|a| (a.max_speed - 2.0).abs() < f64::EPSILON));
}

#[rstest]
fn partially_rejected_patches_stage_the_valid_fields(mut kernel: Kernel) {
    let patch = ConfigPatch {
        max_force: Some(0.5),
        cohesion_weight: Some(-1.0),
        ..ConfigPatch::default()
    };
    let rejected = kernel.apply_config(&patch).expect_err("cohesion rejected");
    assert_eq!(rejected.errors.len(), 1);
    kernel.tick(16.0);
    assert!((kernel.config().max_force - 0.5).abs() < f64::EPSILON);
    assert!((kernel.config().cohesion_weight - 1.0).abs() < f64::EPSILON);
}

#[rstest]
fn resizing_reports_new_bounds(mut kernel: Kernel) {
    assert!(kernel.resize_world(-5.0, 10.0).is_err());
    assert!((kernel.bounds().width() - 800.0).abs() < f64::EPSILON);
    kernel.resize_world(1024.0, 768.0).expect("valid size");
    assert!((kernel.bounds().max.x - 1024.0).abs() < f64::EPSILON);
    assert_eq!(kinds(&kernel), vec!["world-bounds-changed"]);
}

#[rstest]
fn wrappable_worlds_teleport(mut kernel: Kernel) {
    kernel
        .apply_config(&ConfigPatch {
            boundary_mode: Some(BoundaryMode::Wrappable),
            ..ConfigPatch::default()
        })
        .expect("valid patch");
    let id = kernel
        .spawn(Variant::Prey, Vector2::new(799.0, 300.0), Vector2::new(4.0, 0.0))
        .expect("spawned");
    let summary = kernel.tick(REFERENCE_FRAME_MS);
    assert_eq!(summary.wraps, 1);
    let position = kernel.agent(id).map(|a| a.position).expect("alive");
    assert!((position.x - 3.0).abs() < 1e-6, "{position:?}");
    assert!(kinds(&kernel).contains(&"boundary-wrapped"));
}

#[rstest]
fn collidable_worlds_clamp(mut kernel: Kernel) {
    let id = kernel
        .spawn(Variant::Prey, Vector2::new(799.0, 300.0), Vector2::new(4.0, 0.0))
        .expect("spawned");
    kernel.tick(REFERENCE_FRAME_MS);
    let agent = kernel.agent(id).expect("alive");
    assert!(agent.position.x <= 800.0);
    assert!(agent.velocity.x <= 0.0);
    assert!(kinds(&kernel).contains(&"boundary-collision"));
}

#[rstest]
fn predators_kill_and_earn_offspring(mut kernel: Kernel) {
    let hunter = kernel
        .spawn(Variant::Predator, Vector2::new(400.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    let prey = kernel
        .spawn(Variant::Prey, Vector2::new(405.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    if let Some(victim) = kernel.agent_mut(prey) {
        victim.stats.health = 10.0;
    }
    if let Some(predator) = kernel.agent_mut(hunter) {
        predator.stats.reproduction_progress = 60.0;
    }

    let summary = kernel.tick(16.0);
    assert_eq!(summary.deaths, 1);
    assert_eq!(summary.births, 1);
    assert_eq!(summary.predators, 2);
    assert_eq!(summary.prey, 0);
    assert!(kernel.agent(prey).is_none());

    let events = kernel.sink().events();
    assert!(events.contains(&SimEvent::BoidRemoved { agent_id: prey }));
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::BoidReproduced { parent1, parent2: None, .. } if *parent1 == hunter
    )));
}

#[rstest]
fn mates_produce_offspring_near_their_midpoint(mut kernel: Kernel) {
    let male = kernel
        .spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    let female = kernel
        .spawn(Variant::Prey, Vector2::new(410.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    for (id, sex) in [(male, Sex::Male), (female, Sex::Female)] {
        if let Some(agent) = kernel.agent_mut(id) {
            agent.stats.sex = sex;
        }
    }
    if let Some(agent) = kernel.agent_mut(male) {
        agent.stats.reproduction_progress = 99.9;
    }

    let summary = kernel.tick(16.0);
    assert_eq!(summary.births, 1);
    assert_eq!(kernel.count(Variant::Prey), 3);
    let newborn = kernel.agents().last().expect("offspring registered");
    assert!((newborn.position - Vector2::new(405.0, 300.0)).length() < 8.0);
    assert!(kinds(&kernel).contains(&"boid-reproduced"));
}

#[rstest]
fn population_cap_drops_births() {
    let config = SimulationConfig {
        max_population: 2,
        ..SimulationConfig::default()
    };
    let mut kernel = SimulationKernel::new(800.0, 600.0, config, EventBuffer::new())
        .expect("valid world");
    let male = kernel
        .spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    let female = kernel
        .spawn(Variant::Prey, Vector2::new(405.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    for (id, sex) in [(male, Sex::Male), (female, Sex::Female)] {
        if let Some(agent) = kernel.agent_mut(id) {
            agent.stats.sex = sex;
            agent.stats.reproduction_progress = 99.9;
        }
    }
    let summary = kernel.tick(16.0);
    assert_eq!(summary.births, 0);
    assert_eq!(kernel.len(), 2);
}

#[rstest]
fn stats_stay_in_range_over_many_ticks(mut kernel: Kernel) {
    for i in 0..40_u32 {
        let x = 40.0 + f64::from(i % 8) * 90.0;
        let y = 40.0 + f64::from(i / 8) * 110.0;
        let variant = if i % 5 == 0 { Variant::Predator } else { Variant::Prey };
        kernel.spawn(variant, Vector2::new(x, y), Vector2::new(3.0, -2.0));
    }
    for _ in 0..200 {
        kernel.tick(16.0);
        for agent in kernel.agents() {
            assert!((0.0..=100.0).contains(&agent.stats.health));
            assert!((0.0..=100.0).contains(&agent.stats.stamina));
            assert!(agent.velocity.length() <= agent.current_max_speed() + 1e-9);
            assert!(kernel.bounds().contains(agent.position));
        }
    }
}

#[rstest]
fn spawned_ids_skip_externally_registered_ones(mut kernel: Kernel) {
    assert!(kernel.add_agent(boid(1, Variant::Prey, Sex::Female, 100.0, 100.0)));
    let hunter = kernel
        .spawn(Variant::Predator, Vector2::new(500.0, 300.0), Vector2::ZERO)
        .expect("spawned");
    assert_ne!(hunter, AgentId(1));
    assert_eq!(kernel.len(), 2);
    assert_eq!(kernel.count(Variant::Predator), 1);

    assert!(kernel.add_agent(boid(10, Variant::Prey, Sex::Male, 200.0, 100.0)));
    let next = kernel
        .spawn(Variant::Prey, Vector2::new(300.0, 100.0), Vector2::ZERO)
        .expect("spawned");
    assert_eq!(next, AgentId(11));
}

#[rstest]
fn offspring_of_external_parents_get_fresh_ids(mut kernel: Kernel) {
    let mut male = boid(1, Variant::Prey, Sex::Male, 400.0, 300.0);
    male.stats.reproduction_progress = 99.9;
    assert!(kernel.add_agent(male));
    assert!(kernel.add_agent(boid(2, Variant::Prey, Sex::Female, 410.0, 300.0)));

    let summary = kernel.tick(16.0);
    assert_eq!(summary.births, 1);
    let ids: Vec<AgentId> = kernel.agents().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![AgentId(1), AgentId(2), AgentId(3)]);
}

#[rstest]
fn colliding_factory_ids_are_refused(kernel: Kernel) {
    let mut kernel = kernel.with_factory(Box::new(FixedIdFactory));
    assert_eq!(
        kernel.spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::ZERO),
        Some(AgentId(1))
    );
    assert_eq!(
        kernel.spawn(Variant::Predator, Vector2::new(100.0, 100.0), Vector2::ZERO),
        None
    );
    assert_eq!(kernel.len(), 1);
    assert_eq!(kernel.count(Variant::Predator), 0);

    if let Some(agent) = kernel.agent_mut(AgentId(1)) {
        agent.stats.sex = Sex::Male;
        agent.stats.reproduction_progress = 99.9;
    }
    assert!(kernel.add_agent(boid(2, Variant::Prey, Sex::Female, 410.0, 300.0)));
    let summary = kernel.tick(16.0);
    assert_eq!(summary.births, 0);
    assert_eq!(kernel.len(), 2);
    assert!(!kinds(&kernel).contains(&"boid-reproduced"));
}
