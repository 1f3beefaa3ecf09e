//! Agent creation and disposal.
//!
//! The kernel decides when agents are born or die; an [`AgentFactory`]
//! decides what they look like. Hosts that attach sprites or pooled storage
//! to agents implement the trait themselves; [`FlockFactory`] covers the
//! headless case.

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::{Agent, AgentId, MovementLimits, Role, Sex, Variant};
use crate::vector_math::Vector2;

/// Birth request raised by the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    /// Population of the newborn.
    pub variant: Variant,
    /// Where the newborn appears.
    pub position: Vector2,
    /// Parent whose cycle completed.
    pub parent1: AgentId,
    /// Mate, absent for kill-driven births.
    pub parent2: Option<AgentId>,
}

/// Builds and disposes of agents on the kernel's behalf.
pub trait AgentFactory: Send {
    /// Creates a fresh agent with a unique id.
    fn create(&mut self, variant: Variant, position: Vector2, velocity: Vector2) -> Agent;

    /// Creates the offspring described by `request`.
    ///
    /// Returning `None` declines the birth.
    fn spawn_offspring(&mut self, request: &SpawnRequest) -> Option<Agent> {
        Some(self.create(request.variant, request.position, Vector2::ZERO))
    }

    /// Marks `id` as taken by an agent created elsewhere.
    ///
    /// Factories issuing their own ids must never hand out a reserved one.
    fn reserve(&mut self, _id: AgentId) {}

    /// Takes back an agent that left the flock.
    fn recycle(&mut self, agent: Agent);

    /// Updates the limits given to future agents.
    fn set_limits(&mut self, limits: MovementLimits);
}

/// Default factory issuing sequential ids and random sexes.
///
/// # Examples
/// ```
/// use boidworld::agent::{MovementLimits, Variant};
/// use boidworld::factory::{AgentFactory, FlockFactory};
/// use boidworld::vector_math::Vector2;
///
/// let mut factory = FlockFactory::new(7, MovementLimits::default());
/// let first = factory.create(Variant::Prey, Vector2::ZERO, Vector2::ZERO);
/// let second = factory.create(Variant::Predator, Vector2::ZERO, Vector2::ZERO);
/// assert!(second.id > first.id);
/// assert!(second.attack().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FlockFactory {
    next_id: u64,
    limits: MovementLimits,
    rng: StdRng,
    recycled: usize,
}

impl FlockFactory {
    /// Creates a factory whose sex assignment is reproducible from `seed`.
    #[must_use]
    pub fn new(seed: u64, limits: MovementLimits) -> Self {
        Self {
            next_id: 1,
            limits,
            rng: StdRng::seed_from_u64(seed),
            recycled: 0,
        }
    }

    /// Number of agents handed back so far.
    #[must_use]
    pub const fn recycled(&self) -> usize {
        self.recycled
    }

    /// Id the next agent will receive.
    #[must_use]
    pub const fn peek_id(&self) -> AgentId {
        AgentId(self.next_id)
    }
}

impl AgentFactory for FlockFactory {
    fn create(&mut self, variant: Variant, position: Vector2, velocity: Vector2) -> Agent {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        let sex = if self.rng.random_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        };
        Agent::new(id, Role::for_variant(variant), sex, position, self.limits).with_velocity(velocity)
    }

    fn reserve(&mut self, id: AgentId) {
        self.next_id = self.next_id.max(id.into_inner().saturating_add(1));
    }

    fn recycle(&mut self, agent: Agent) {
        trace!("{} returned to factory", agent.id);
        self.recycled += 1;
    }

    fn set_limits(&mut self, limits: MovementLimits) {
        self.limits = limits;
    }
}
