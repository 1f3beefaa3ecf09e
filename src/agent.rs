//! Per-boid state: kinematics, movement limits and biological stats.
//!
//! Predator-only data lives in [`Role::Predator`], so attack logic is reached
//! through an exhaustive match rather than by probing for optional fields.
//! Every mutator follows the same rule: malformed input is a no-op reported
//! through the return value, and stats are clamped into `[0, 100]`.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::numeric::{clamp_stat, is_positive_finite, ms_to_seconds};
use crate::vector_math::{Vector2, VectorExt};
use crate::{
    DEFAULT_ATTACK_COOLDOWN_MS, DEFAULT_ATTACK_DAMAGE, DEFAULT_ATTACK_RANGE,
    DEPLETED_SPEED_FACTOR, PREDATOR_REPRODUCTION_CAP, PREY_REPRODUCTION_CAP, STAMINA_DRAIN_PER_SECOND,
    STAMINA_RECOVERY_DELAY_MS, STAMINA_RECOVERY_PER_SECOND, STAT_MAX,
};

/// Unique agent identifier issued by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl AgentId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for AgentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boid#{}", self.0)
    }
}

/// Population an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    /// Flocks, flees predators and breeds.
    Prey,
    /// Hunts prey and breeds.
    Predator,
}

/// Biological sex used to pair mates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Sex {
    /// The sex a partner must have.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

/// Strike parameters carried by predators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    /// Health removed by one strike.
    pub damage: f64,
    /// Distance within which a strike lands.
    pub range: f64,
    /// Delay between strikes.
    pub cooldown_ms: f64,
    /// Time left before the next strike is allowed.
    pub cooldown_remaining_ms: f64,
}

impl Default for AttackStats {
    fn default() -> Self {
        Self {
            damage: DEFAULT_ATTACK_DAMAGE,
            range: DEFAULT_ATTACK_RANGE,
            cooldown_ms: DEFAULT_ATTACK_COOLDOWN_MS,
            cooldown_remaining_ms: 0.0,
        }
    }
}

impl AttackStats {
    /// Whether the cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining_ms <= 0.0
    }

    /// Starts a new cooldown after a strike.
    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining_ms = self.cooldown_ms;
    }

    /// Advances the cooldown timer.
    pub fn cool_down(&mut self, dt_ms: f64) {
        self.cooldown_remaining_ms = (self.cooldown_remaining_ms - dt_ms).max(0.0);
    }
}

/// Variant-specific stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Role {
    /// Prey carry no extra state.
    Prey,
    /// Predators carry attack stats.
    Predator {
        /// Strike parameters and cooldown.
        attack: AttackStats,
    },
}

impl Role {
    /// Default role for `variant`.
    #[must_use]
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Prey => Self::Prey,
            Variant::Predator => Self::Predator {
                attack: AttackStats::default(),
            },
        }
    }

    /// The population this role belongs to.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        match self {
            Self::Prey => Variant::Prey,
            Self::Predator { .. } => Variant::Predator,
        }
    }

    /// Completed reproduction cycles allowed for this role.
    #[must_use]
    pub const fn reproduction_cap(&self) -> u32 {
        match self {
            Self::Prey => PREY_REPRODUCTION_CAP,
            Self::Predator { .. } => PREDATOR_REPRODUCTION_CAP,
        }
    }
}

/// Stamina threshold crossed during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaminaTransition {
    /// Stamina reached zero.
    Depleted,
    /// Stamina refilled after depletion.
    Recovered,
}

/// Biological state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioStats {
    /// Current health in `[0, max_health]`.
    pub health: f64,
    /// Health ceiling.
    pub max_health: f64,
    /// Current stamina in `[0, 100]`.
    pub stamina: f64,
    /// Set when stamina hits zero; cleared once fully recovered.
    pub stamina_depleted: bool,
    /// Time spent depleted.
    pub depleted_for_ms: f64,
    /// Multiplier on the configured max speed.
    pub speed: f64,
    /// Progress toward the next offspring in `[0, 100]`.
    pub reproduction_progress: f64,
    /// Completed reproduction cycles.
    pub reproductions: u32,
    /// Grows by one with each completed reproduction cycle.
    pub level: u32,
    /// Sex used for mate selection.
    pub sex: Sex,
    /// Variant-specific state.
    pub role: Role,
}

impl BioStats {
    /// Fresh stats for a newborn with the given role and sex.
    #[must_use]
    pub const fn new(role: Role, sex: Sex) -> Self {
        Self {
            health: STAT_MAX,
            max_health: STAT_MAX,
            stamina: STAT_MAX,
            stamina_depleted: false,
            depleted_for_ms: 0.0,
            speed: 1.0,
            reproduction_progress: 0.0,
            reproductions: 0,
            level: 1,
            sex,
            role,
        }
    }
}

/// Movement limits refreshed from configuration each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementLimits {
    /// Velocity ceiling before stamina effects.
    pub max_speed: f64,
    /// Per-behaviour steering ceiling.
    pub max_force: f64,
    /// Neighbour radius.
    pub perception_radius: f64,
}

impl Default for MovementLimits {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_force: 0.1,
            perception_radius: 50.0,
        }
    }
}

/// A simulated boid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier.
    pub id: AgentId,
    /// World-space position.
    pub position: Vector2,
    /// Velocity per reference frame.
    pub velocity: Vector2,
    /// Steering accumulated for the next integration.
    pub acceleration: Vector2,
    /// Velocity ceiling before stamina effects.
    pub max_speed: f64,
    /// Per-behaviour steering ceiling.
    pub max_force: f64,
    /// Neighbour radius.
    pub perception_radius: f64,
    /// Biological state.
    pub stats: BioStats,
}

impl Agent {
    /// Creates an agent at rest.
    ///
    /// # Examples
    /// ```
    /// use boidworld::agent::{Agent, AgentId, MovementLimits, Role, Sex, Variant};
    /// use boidworld::vector_math::Vector2;
    ///
    /// let boid = Agent::new(
    ///     AgentId(1),
    ///     Role::for_variant(Variant::Predator),
    ///     Sex::Female,
    ///     Vector2::new(10.0, 20.0),
    ///     MovementLimits::default(),
    /// );
    /// assert_eq!(boid.variant(), Variant::Predator);
    /// assert!(boid.attack().is_some());
    /// ```
    #[must_use]
    pub const fn new(
        id: AgentId,
        role: Role,
        sex: Sex,
        position: Vector2,
        limits: MovementLimits,
    ) -> Self {
        Self {
            id,
            position,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            max_speed: limits.max_speed,
            max_force: limits.max_force,
            perception_radius: limits.perception_radius,
            stats: BioStats::new(role, sex),
        }
    }

    /// Sets the initial velocity.
    #[must_use]
    pub const fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    /// The population this agent belongs to.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.stats.role.variant()
    }

    /// Attack stats, present only for predators.
    #[must_use]
    pub const fn attack(&self) -> Option<&AttackStats> {
        match &self.stats.role {
            Role::Predator { attack } => Some(attack),
            Role::Prey => None,
        }
    }

    /// Mutable attack stats, present only for predators.
    pub fn attack_mut(&mut self) -> Option<&mut AttackStats> {
        match &mut self.stats.role {
            Role::Predator { attack } => Some(attack),
            Role::Prey => None,
        }
    }

    /// Whether health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.health > 0.0
    }

    /// Max speed after stamina effects.
    #[must_use]
    pub fn current_max_speed(&self) -> f64 {
        if self.stats.stamina_depleted {
            self.max_speed * DEPLETED_SPEED_FACTOR
        } else {
            self.max_speed
        }
    }

    /// Copies configured limits onto the agent, honouring its speed stat.
    pub fn refresh_limits(&mut self, limits: MovementLimits) {
        self.max_speed = limits.max_speed * self.stats.speed;
        self.max_force = limits.max_force;
        self.perception_radius = limits.perception_radius;
    }

    /// Adds a steering force to the acceleration accumulator.
    ///
    /// Non-finite forces are dropped.
    pub fn apply_force(&mut self, force: Vector2) {
        if force.is_finite() {
            self.acceleration += force;
        }
    }

    /// Integrates one step and returns the new velocity.
    ///
    /// `frames` is the step length in reference frames. The accumulator is
    /// reset afterwards.
    pub fn integrate(&mut self, frames: f64) -> Vector2 {
        self.velocity = (self.velocity + self.acceleration).limit(self.current_max_speed());
        self.position += self.velocity * frames;
        self.acceleration = Vector2::ZERO;
        self.velocity
    }

    /// Applies damage and reports whether it killed the agent.
    ///
    /// Returns `true` only on the transition to zero health. Non-positive or
    /// non-finite amounts, and damage to an already dead agent, are ignored.
    ///
    /// # Examples
    /// ```
    /// use boidworld::agent::{Agent, AgentId, MovementLimits, Role, Sex};
    /// use boidworld::vector_math::Vector2;
    ///
    /// let mut boid = Agent::new(AgentId(7), Role::Prey, Sex::Male, Vector2::ZERO, MovementLimits::default());
    /// assert!(!boid.take_damage(-3.0));
    /// assert!(boid.take_damage(250.0));
    /// assert!(!boid.take_damage(10.0));
    /// assert_eq!(boid.stats.health, 0.0);
    /// ```
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if !is_positive_finite(amount) || !self.is_alive() {
            return false;
        }
        self.stats.health = (self.stats.health - amount).max(0.0);
        !self.is_alive()
    }

    /// Restores health up to the maximum; returns whether anything changed.
    pub fn heal(&mut self, amount: f64) -> bool {
        if !is_positive_finite(amount) || !self.is_alive() {
            return false;
        }
        let before = self.stats.health;
        self.stats.health = (before + amount).min(self.stats.max_health);
        self.stats.health > before
    }

    /// Whether further reproduction cycles are allowed.
    #[must_use]
    pub const fn can_reproduce(&self) -> bool {
        self.stats.reproductions < self.stats.role.reproduction_cap()
    }

    /// Adds reproduction progress and reports a completed cycle.
    ///
    /// Reaching 100 resets progress, bumps the completion counter and the
    /// level, and returns `true`. Invalid amounts and agents at their cap
    /// return `false` without changing state.
    pub fn increase_reproduction(&mut self, amount: f64) -> bool {
        if !is_positive_finite(amount) || !self.can_reproduce() {
            return false;
        }
        let progress = self.stats.reproduction_progress + amount;
        if progress < STAT_MAX {
            self.stats.reproduction_progress = progress;
            return false;
        }
        self.stats.reproduction_progress = 0.0;
        self.stats.reproductions += 1;
        self.stats.level += 1;
        debug!(
            "{} completed reproduction cycle {}",
            self.id, self.stats.reproductions
        );
        true
    }

    /// Advances stamina by `dt_ms` and reports any threshold crossed.
    ///
    /// Movement drains stamina in proportion to `|velocity| / max_speed`.
    /// Once empty the agent waits out the recovery delay, then refills at a
    /// fixed rate; drain is suspended until the refill completes.
    pub fn update_stamina(&mut self, dt_ms: f64) -> Option<StaminaTransition> {
        if self.stats.stamina_depleted {
            return self.recover_stamina(dt_ms);
        }

        let effort = if self.max_speed > 0.0 {
            (self.velocity.length() / self.max_speed).min(1.0)
        } else {
            0.0
        };
        let stats = &mut self.stats;
        stats.stamina =
            clamp_stat(stats.stamina - STAMINA_DRAIN_PER_SECOND * effort * ms_to_seconds(dt_ms));
        if stats.stamina <= 0.0 {
            stats.stamina_depleted = true;
            stats.depleted_for_ms = 0.0;
            return Some(StaminaTransition::Depleted);
        }
        None
    }

    fn recover_stamina(&mut self, dt_ms: f64) -> Option<StaminaTransition> {
        let stats = &mut self.stats;
        let resting_since = stats.depleted_for_ms.max(STAMINA_RECOVERY_DELAY_MS);
        stats.depleted_for_ms += dt_ms;
        if stats.depleted_for_ms < STAMINA_RECOVERY_DELAY_MS {
            return None;
        }
        // Only the part of this step past the delay refills.
        let refill_ms = stats.depleted_for_ms - resting_since;
        stats.stamina =
            clamp_stat(stats.stamina + STAMINA_RECOVERY_PER_SECOND * ms_to_seconds(refill_ms));
        if stats.stamina < STAT_MAX {
            return None;
        }
        stats.stamina_depleted = false;
        stats.depleted_for_ms = 0.0;
        Some(StaminaTransition::Recovered)
    }
}
