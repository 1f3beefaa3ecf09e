//! Weighted sum of registered behaviours.

use log::warn;

use super::{
    Alignment, BoundaryAvoidance, Cohesion, Hunting, Neighbour, ObstacleAvoidance,
    PredatorAvoidance, Separation, SteeringBehaviour, SteeringContext,
};
use crate::agent::Agent;
use crate::config::SimulationConfig;
use crate::vector_math::Vector2;

/// A registered behaviour and its weight.
pub struct WeightedBehaviour {
    /// Multiplier applied to the behaviour's output.
    pub weight: f64,
    /// The behaviour itself.
    pub behaviour: Box<dyn SteeringBehaviour>,
}

/// Sums weighted behaviour outputs.
///
/// Each behaviour clamps its own force, but the weighted sum is handed to
/// the integrator as is; several strong behaviours together may exceed the
/// agent's `max_force`.
#[derive(Default)]
pub struct CompositeBehaviour {
    behaviours: Vec<WeightedBehaviour>,
}

impl CompositeBehaviour {
    /// An empty composite.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            behaviours: Vec::new(),
        }
    }

    /// The full flocking stack weighted from `config`.
    ///
    /// Boundary, obstacle, evasion and hunting forces carry weight 1.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new()
            .with(config.alignment_weight, Alignment)
            .with(config.cohesion_weight, Cohesion)
            .with(config.separation_weight, Separation)
            .with(1.0, BoundaryAvoidance)
            .with(1.0, ObstacleAvoidance)
            .with(1.0, PredatorAvoidance)
            .with(1.0, Hunting)
    }

    /// Registers a behaviour, builder style.
    #[must_use]
    pub fn with(mut self, weight: f64, behaviour: impl SteeringBehaviour + 'static) -> Self {
        self.add(weight, behaviour);
        self
    }

    /// Registers a behaviour.
    pub fn add(&mut self, weight: f64, behaviour: impl SteeringBehaviour + 'static) {
        self.behaviours.push(WeightedBehaviour {
            weight,
            behaviour: Box::new(behaviour),
        });
    }

    /// Updates the weight of the behaviour called `name`.
    ///
    /// Returns `false` when no such behaviour is registered.
    pub fn set_weight(&mut self, name: &str, weight: f64) -> bool {
        match self.behaviours.iter_mut().find(|b| b.behaviour.name() == name) {
            Some(entry) => {
                entry.weight = weight;
                true
            }
            None => {
                warn!("no steering behaviour named {name} to reweight");
                false
            }
        }
    }

    /// Copies the configurable weights from `config`.
    pub fn sync_weights(&mut self, config: &SimulationConfig) {
        self.set_weight("alignment", config.alignment_weight);
        self.set_weight("cohesion", config.cohesion_weight);
        self.set_weight("separation", config.separation_weight);
    }

    /// Weight of the behaviour called `name`.
    #[must_use]
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.behaviours
            .iter()
            .find(|b| b.behaviour.name() == name)
            .map(|b| b.weight)
    }

    /// Number of registered behaviours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviours.len()
    }

    /// Whether no behaviour is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviours.is_empty()
    }

    /// Weighted sum of every behaviour's force.
    #[must_use]
    pub fn calculate(
        &self,
        agent: &Agent,
        neighbours: &[Neighbour],
        context: &SteeringContext<'_>,
    ) -> Vector2 {
        self.behaviours
            .iter()
            .map(|entry| entry.behaviour.calculate(agent, neighbours, context) * entry.weight)
            .filter(|force| force.is_finite())
            .fold(Vector2::ZERO, |total, force| total + force)
    }
}
