//! The simulation kernel.
//!
//! [`SimulationKernel`] owns the flock, the spatial index and the composite
//! behaviour. Each call to [`SimulationKernel::tick`] runs the full pipeline:
//!
//! 1. promote any configuration applied since the last tick;
//! 2. rebuild the index and compute every steering force from one snapshot;
//! 3. integrate motion, resolve world edges and update stamina;
//! 4. rebuild the index from the new positions and resolve combat and mating;
//! 5. remove the dead and spawn the newborn.
//!
//! Every state transition is reported to the injected [`EventSink`].

mod boundary;
mod interactions;
#[cfg(test)]
mod tests;

use hashbrown::HashMap;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use self::boundary::BoundaryTracker;
use self::interactions::{resolve_combat, resolve_mating, Proximity};
use crate::agent::{Agent, AgentId, StaminaTransition, Variant};
use crate::behaviours::{CompositeBehaviour, Neighbour, SteeringContext};
use crate::config::{ConfigPatch, ConfigRejected, SimulationConfig};
use crate::events::{EventSink, SimEvent};
use crate::factory::{AgentFactory, FlockFactory, SpawnRequest};
use crate::numeric::is_positive_finite;
use crate::spatial::{IndexError, Quadtree, Rect, SpatialIndex};
use crate::vector_math::Vector2;
use crate::world::Obstacle;
use crate::{EVASION_RADIUS_FACTOR, HUNTING_RADIUS_FACTOR, OFFSPRING_JITTER, REFERENCE_FRAME_MS};

/// Construction failures.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The world rectangle cannot hold any agent.
    #[error(transparent)]
    InvalidBounds(#[from] IndexError),
    /// The initial configuration contains invalid fields.
    #[error("invalid initial configuration: {0}")]
    InvalidConfig(#[from] ConfigRejected),
}

/// Per-tick counters for host-side reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Offspring added.
    pub births: usize,
    /// Agents removed after dying.
    pub deaths: usize,
    /// Teleports across a wrappable edge.
    pub wraps: usize,
    /// Stuck-escape impulses applied.
    pub escapes: usize,
    /// Live prey after the tick.
    pub prey: usize,
    /// Live predators after the tick.
    pub predators: usize,
}

/// Radius a behaviour stack may look into for `agent`.
fn query_radius(agent: &Agent, config: &SimulationConfig) -> f64 {
    let reach = match agent.variant() {
        Variant::Prey => EVASION_RADIUS_FACTOR,
        Variant::Predator => HUNTING_RADIUS_FACTOR,
    };
    (agent.perception_radius * reach).max(config.separation_radius)
}

/// Owns and advances a flock.
///
/// # Examples
/// ```
/// use boidworld::agent::Variant;
/// use boidworld::config::SimulationConfig;
/// use boidworld::events::EventBuffer;
/// use boidworld::kernel::SimulationKernel;
/// use boidworld::vector_math::Vector2;
///
/// let mut kernel =
///     SimulationKernel::new(800.0, 600.0, SimulationConfig::default(), EventBuffer::new())?;
/// kernel.spawn(Variant::Prey, Vector2::new(400.0, 300.0), Vector2::new(1.0, 0.0));
/// let summary = kernel.tick(16.0);
/// assert_eq!(summary.prey, 1);
/// assert!(kernel.elapsed_ms() > 0.0);
/// # Ok::<(), boidworld::kernel::KernelError>(())
/// ```
pub struct SimulationKernel<S: EventSink> {
    config: SimulationConfig,
    pending: Option<SimulationConfig>,
    behaviour: CompositeBehaviour,
    index: Box<dyn SpatialIndex>,
    factory: Box<dyn AgentFactory>,
    sink: S,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    bounds: Rect,
    boundaries: BoundaryTracker,
    rng: StdRng,
    elapsed_ms: f64,
}

impl<S: EventSink> SimulationKernel<S> {
    /// Creates an empty world of `width` by `height`.
    ///
    /// The kernel starts with a [`Quadtree`] index, a [`FlockFactory`] and
    /// the full default behaviour stack.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidBounds`] for non-positive or non-finite
    /// dimensions and [`KernelError::InvalidConfig`] when `config` fails
    /// validation.
    pub fn new(width: f64, height: f64, config: SimulationConfig, sink: S) -> Result<Self, KernelError> {
        config.validate()?;
        let index = Quadtree::new(width, height)?;
        info!("world created at {width}x{height}");
        Ok(Self {
            bounds: index.bounds(),
            index: Box::new(index),
            factory: Box::new(FlockFactory::new(0, config.limits())),
            behaviour: CompositeBehaviour::from_config(&config),
            pending: None,
            config,
            sink,
            agents: Vec::new(),
            obstacles: Vec::new(),
            boundaries: BoundaryTracker::default(),
            rng: StdRng::seed_from_u64(0),
            elapsed_ms: 0.0,
        })
    }

    /// Replaces the spatial index, resizing it to the current world.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidBounds`] if the index rejects the
    /// current dimensions.
    pub fn with_index(mut self, mut index: Box<dyn SpatialIndex>) -> Result<Self, KernelError> {
        index.update_bounds(self.bounds.width(), self.bounds.height())?;
        self.index = index;
        Ok(self)
    }

    /// Replaces the agent factory.
    #[must_use]
    pub fn with_factory(mut self, mut factory: Box<dyn AgentFactory>) -> Self {
        factory.set_limits(self.config.limits());
        self.factory = factory;
        self
    }

    /// Replaces the behaviour stack.
    #[must_use]
    pub fn with_behaviour(mut self, behaviour: CompositeBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Seeds the RNG used for offspring placement.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Asks the factory for a new agent and registers it.
    ///
    /// Returns `None` if the factory issued an id already in the flock; the
    /// agent is handed back to the factory.
    pub fn spawn(
        &mut self,
        variant: Variant,
        position: Vector2,
        velocity: Vector2,
    ) -> Option<AgentId> {
        let agent = self.factory.create(variant, position, velocity);
        let id = agent.id;
        if self.is_taken(id) {
            self.factory.recycle(agent);
            return None;
        }
        self.insert(agent);
        Some(id)
    }

    /// Registers an externally created agent.
    ///
    /// Returns `false`, leaving the flock untouched, if the id is taken.
    /// Accepted ids are reserved with the factory.
    pub fn add_agent(&mut self, agent: Agent) -> bool {
        if self.is_taken(agent.id) {
            return false;
        }
        self.insert(agent);
        true
    }

    fn is_taken(&self, id: AgentId) -> bool {
        let taken = self.agents.iter().any(|a| a.id == id);
        if taken {
            warn!("{id} is already registered");
        }
        taken
    }

    /// Adds an agent whose id is known to be free.
    fn insert(&mut self, mut agent: Agent) {
        agent.refresh_limits(self.config.limits());
        self.factory.reserve(agent.id);
        trace!("{} joined at {:?}", agent.id, agent.position);
        self.agents.push(agent);
    }

    /// Removes an agent and hands it back to the caller.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let slot = self.agents.iter().position(|a| a.id == id)?;
        let agent = self.agents.remove(slot);
        self.boundaries.forget(id);
        self.sink.emit(SimEvent::BoidRemoved { agent_id: id });
        Some(agent)
    }

    /// Looks up an agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Looks up an agent for modification between ticks.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// Every live agent in registration order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the flock is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents of `variant`.
    #[must_use]
    pub fn count(&self, variant: Variant) -> usize {
        self.agents.iter().filter(|a| a.variant() == variant).count()
    }

    /// Adds a static obstacle; malformed obstacles are refused.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> bool {
        if !obstacle.position.is_finite() || !is_positive_finite(obstacle.radius) {
            warn!("ignoring malformed obstacle {obstacle:?}");
            return false;
        }
        self.obstacles.push(obstacle);
        true
    }

    /// Static obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Removes every obstacle.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Stages a configuration change for the next tick.
    ///
    /// Valid fields are staged even when others are rejected.
    ///
    /// # Errors
    /// Returns [`ConfigRejected`] listing the fields that were not staged.
    pub fn apply_config(&mut self, patch: &ConfigPatch) -> Result<(), ConfigRejected> {
        let mut next = self.pending.take().unwrap_or_else(|| self.config.clone());
        let outcome = next.apply(patch);
        self.pending = Some(next);
        outcome
    }

    /// Configuration used by the current tick.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Configuration waiting for the next tick, if any.
    #[must_use]
    pub const fn pending_config(&self) -> Option<&SimulationConfig> {
        self.pending.as_ref()
    }

    /// Resizes the world.
    ///
    /// Agents left outside are brought back by the next tick's edge rule.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidBounds`] and keeps the old size when a
    /// dimension is not positive and finite.
    pub fn resize_world(&mut self, width: f64, height: f64) -> Result<(), KernelError> {
        self.index.update_bounds(width, height)?;
        self.bounds = self.index.bounds();
        info!("world resized to {width}x{height}");
        self.sink.emit(SimEvent::WorldBoundsChanged { width, height });
        Ok(())
    }

    /// The world rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Simulated time accumulated by ticks.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// The event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The event sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the kernel and returns its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Advances the simulation by `dt_ms` simulated milliseconds.
    ///
    /// Non-finite or non-positive steps leave the world untouched.
    pub fn tick(&mut self, dt_ms: f64) -> TickSummary {
        if !is_positive_finite(dt_ms) {
            debug!("ignoring tick with dt {dt_ms}");
            return TickSummary::default();
        }
        self.promote_pending_config();
        let limits = self.config.limits();
        for agent in &mut self.agents {
            agent.refresh_limits(limits);
        }

        let slots: HashMap<AgentId, usize> = self
            .agents
            .iter()
            .enumerate()
            .map(|(slot, agent)| (agent.id, slot))
            .collect();
        let indexed = self.index.rebuild(&self.agents);
        if indexed < self.agents.len() {
            trace!("{} agents outside the index", self.agents.len() - indexed);
        }
        self.steer(&slots);

        let now_ms = self.elapsed_ms + dt_ms;
        let mut summary = self.advance(dt_ms, now_ms);

        self.index.rebuild(&self.agents);
        let near = Proximity {
            index: &*self.index,
            slots: &slots,
        };
        let mut births = resolve_combat(&mut self.agents, near, &mut self.sink);
        births.extend(resolve_mating(&mut self.agents, near, dt_ms));

        summary.deaths = self.sweep_dead();
        summary.births = self.spawn_births(births);
        summary.prey = self.count(Variant::Prey);
        summary.predators = self.count(Variant::Predator);
        self.elapsed_ms = now_ms;
        trace!("tick at {now_ms:.0}ms: {summary:?}");
        summary
    }

    fn promote_pending_config(&mut self) {
        let Some(next) = self.pending.take() else {
            return;
        };
        if next.boundary_mode != self.config.boundary_mode {
            self.boundaries.clear();
        }
        self.behaviour.sync_weights(&next);
        self.factory.set_limits(next.limits());
        debug!("configuration change applied");
        self.config = next;
    }

    /// Accumulates every agent's composite force from one neighbour snapshot.
    fn steer(&mut self, slots: &HashMap<AgentId, usize>) {
        let context = SteeringContext {
            bounds: self.bounds,
            obstacles: &self.obstacles,
            config: &self.config,
        };
        let forces: Vec<Vector2> = self
            .agents
            .iter()
            .map(|agent| {
                let mut neighbours = Vec::new();
                let radius = query_radius(agent, &self.config);
                self.index.for_each_within(agent.position, radius, &mut |entry| {
                    if entry.id == agent.id {
                        return;
                    }
                    if let Some(other) = slots.get(&entry.id).and_then(|&slot| self.agents.get(slot)) {
                        neighbours.push(Neighbour::observe(agent, other));
                    }
                });
                self.behaviour.calculate(agent, &neighbours, &context)
            })
            .collect();
        for (agent, force) in self.agents.iter_mut().zip(forces) {
            agent.apply_force(force);
        }
    }

    /// Moves every agent and applies the per-agent timers.
    fn advance(&mut self, dt_ms: f64, now_ms: f64) -> TickSummary {
        let frames = dt_ms / REFERENCE_FRAME_MS;
        let mut summary = TickSummary::default();
        for agent in &mut self.agents {
            agent.integrate(frames);
            let edge = self
                .boundaries
                .resolve(agent, &self.bounds, &self.config, now_ms, &mut self.sink);
            summary.wraps += usize::from(edge.wrapped);
            summary.escapes += usize::from(edge.escaped);

            match agent.update_stamina(dt_ms) {
                Some(StaminaTransition::Depleted) => {
                    debug!("{} is exhausted", agent.id);
                    self.sink
                        .emit(SimEvent::BoidStaminaDepleted { agent_id: agent.id });
                }
                Some(StaminaTransition::Recovered) => {
                    self.sink
                        .emit(SimEvent::BoidStaminaRecovered { agent_id: agent.id });
                }
                None => {}
            }
            if let Some(attack) = agent.attack_mut() {
                attack.cool_down(dt_ms);
            }
        }
        summary
    }

    /// Removes dead agents and returns how many left.
    fn sweep_dead(&mut self) -> usize {
        let (alive, dead): (Vec<Agent>, Vec<Agent>) =
            std::mem::take(&mut self.agents).into_iter().partition(Agent::is_alive);
        self.agents = alive;
        let deaths = dead.len();
        for agent in dead {
            self.boundaries.forget(agent.id);
            self.sink.emit(SimEvent::BoidRemoved { agent_id: agent.id });
            self.factory.recycle(agent);
        }
        deaths
    }

    /// Spawns offspring near their requested position, honouring the cap.
    fn spawn_births(&mut self, requests: Vec<SpawnRequest>) -> usize {
        let mut born = 0;
        for request in requests {
            if self.agents.len() >= self.config.max_population {
                debug!(
                    "population cap {} reached, dropping offspring of {}",
                    self.config.max_population, request.parent1
                );
                continue;
            }
            let jitter = Vector2::new(
                self.rng.random_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
                self.rng.random_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
            );
            let placed = SpawnRequest {
                position: (request.position + jitter).clamp(self.bounds.min, self.bounds.max),
                ..request
            };
            let Some(child) = self.factory.spawn_offspring(&placed) else {
                debug!("factory declined offspring of {}", request.parent1);
                continue;
            };
            let offspring = child.id;
            if self.is_taken(offspring) {
                self.factory.recycle(child);
                continue;
            }
            self.insert(child);
            self.sink.emit(SimEvent::BoidReproduced {
                parent1: placed.parent1,
                parent2: placed.parent2,
                offspring,
            });
            born += 1;
        }
        born
    }
}
