//! Simulation configuration and the validated patch boundary.
//!
//! Hosts change configuration between ticks by applying a [`ConfigPatch`].
//! Each field is validated on its own: rejected fields keep their previous
//! value while the rest of the patch still lands.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::MovementLimits;
use crate::world::BoundaryMode;

/// A single rejected configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Weights, radii and limits must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field, camelCase.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// `NaN` and infinities are never accepted.
    #[error("{field} must be finite")]
    NonFinite {
        /// Offending field, camelCase.
        field: &'static str,
    },
    /// The patch document could not be parsed.
    #[error("invalid configuration patch: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Name of the rejected field, if the error concerns one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::NonPositive { field, .. } | Self::NonFinite { field } => Some(field),
            Self::Parse(_) => None,
        }
    }
}

/// Every field rejected while applying a patch.
#[derive(Debug, Error)]
#[error("{} configuration field(s) rejected", .errors.len())]
pub struct ConfigRejected {
    /// Individual rejections in field order.
    pub errors: Vec<ConfigError>,
}

fn check_positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(value)
}

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Weight of the alignment behaviour.
    pub alignment_weight: f64,
    /// Weight of the cohesion behaviour.
    pub cohesion_weight: f64,
    /// Weight of the separation behaviour.
    pub separation_weight: f64,
    /// Neighbour radius for alignment and cohesion.
    pub perception_radius: f64,
    /// Radius within which neighbours repel.
    pub separation_radius: f64,
    /// Width of the band along each edge where boundary forces act.
    pub boundary_margin: f64,
    /// Scale of boundary forces.
    pub boundary_force_multiplier: f64,
    /// Exponent shaping boundary force growth toward the edge.
    pub boundary_force_ramp: f64,
    /// Wrap around or collide with the world edge.
    pub boundary_mode: BoundaryMode,
    /// Time pinned against one edge before an escape impulse.
    pub boundary_stuck_threshold_ms: f64,
    /// Distance from an obstacle surface at which avoidance starts.
    pub obstacle_perception_radius: f64,
    /// Scale of obstacle avoidance forces.
    pub obstacle_force_multiplier: f64,
    /// Base velocity ceiling.
    pub max_speed: f64,
    /// Per-behaviour steering ceiling.
    pub max_force: f64,
    /// Population above which births are dropped.
    pub max_population: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            separation_weight: 1.5,
            perception_radius: 50.0,
            separation_radius: 25.0,
            boundary_margin: 50.0,
            boundary_force_multiplier: 1.0,
            boundary_force_ramp: 2.0,
            boundary_mode: BoundaryMode::Collidable,
            boundary_stuck_threshold_ms: 2000.0,
            obstacle_perception_radius: 40.0,
            obstacle_force_multiplier: 1.5,
            max_speed: 4.0,
            max_force: 0.1,
            max_population: 500,
        }
    }
}

/// Partial configuration update; absent fields are left untouched.
///
/// # Examples
/// ```
/// use boidworld::config::{ConfigPatch, SimulationConfig};
///
/// let mut config = SimulationConfig::default();
/// let patch = ConfigPatch::from_json(r#"{"maxSpeed": 6.0, "separationWeight": -1.0}"#)?;
/// let rejected = config.apply(&patch).unwrap_err();
/// assert_eq!(rejected.errors.len(), 1);
/// assert_eq!(config.max_speed, 6.0);
/// assert_eq!(config.separation_weight, 1.5);
/// # Ok::<(), boidworld::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    /// See [`SimulationConfig::alignment_weight`].
    pub alignment_weight: Option<f64>,
    /// See [`SimulationConfig::cohesion_weight`].
    pub cohesion_weight: Option<f64>,
    /// See [`SimulationConfig::separation_weight`].
    pub separation_weight: Option<f64>,
    /// See [`SimulationConfig::perception_radius`].
    pub perception_radius: Option<f64>,
    /// See [`SimulationConfig::separation_radius`].
    pub separation_radius: Option<f64>,
    /// See [`SimulationConfig::boundary_margin`].
    pub boundary_margin: Option<f64>,
    /// See [`SimulationConfig::boundary_force_multiplier`].
    pub boundary_force_multiplier: Option<f64>,
    /// See [`SimulationConfig::boundary_force_ramp`].
    pub boundary_force_ramp: Option<f64>,
    /// See [`SimulationConfig::boundary_mode`].
    pub boundary_mode: Option<BoundaryMode>,
    /// See [`SimulationConfig::boundary_stuck_threshold_ms`].
    pub boundary_stuck_threshold_ms: Option<f64>,
    /// See [`SimulationConfig::obstacle_perception_radius`].
    pub obstacle_perception_radius: Option<f64>,
    /// See [`SimulationConfig::obstacle_force_multiplier`].
    pub obstacle_force_multiplier: Option<f64>,
    /// See [`SimulationConfig::max_speed`].
    pub max_speed: Option<f64>,
    /// See [`SimulationConfig::max_force`].
    pub max_force: Option<f64>,
    /// See [`SimulationConfig::max_population`].
    pub max_population: Option<usize>,
}

impl ConfigPatch {
    /// Parses a camelCase JSON patch document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// A patch that sets every field to the values in `config`.
    #[must_use]
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            alignment_weight: Some(config.alignment_weight),
            cohesion_weight: Some(config.cohesion_weight),
            separation_weight: Some(config.separation_weight),
            perception_radius: Some(config.perception_radius),
            separation_radius: Some(config.separation_radius),
            boundary_margin: Some(config.boundary_margin),
            boundary_force_multiplier: Some(config.boundary_force_multiplier),
            boundary_force_ramp: Some(config.boundary_force_ramp),
            boundary_mode: Some(config.boundary_mode),
            boundary_stuck_threshold_ms: Some(config.boundary_stuck_threshold_ms),
            obstacle_perception_radius: Some(config.obstacle_perception_radius),
            obstacle_force_multiplier: Some(config.obstacle_force_multiplier),
            max_speed: Some(config.max_speed),
            max_force: Some(config.max_force),
            max_population: Some(config.max_population),
        }
    }
}

/// Copies each present positive field from the patch, collecting rejections.
macro_rules! apply_positive {
    ($config:ident, $patch:ident, $errors:ident, $($field:ident => $name:literal),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                match check_positive($name, value) {
                    Ok(accepted) => $config.$field = accepted,
                    Err(err) => $errors.push(err),
                }
            }
        )+
    };
}

impl SimulationConfig {
    /// Applies `patch`, keeping the previous value of every rejected field.
    ///
    /// # Errors
    /// Returns [`ConfigRejected`] listing each field that was not applied.
    pub fn apply(&mut self, patch: &ConfigPatch) -> Result<(), ConfigRejected> {
        let mut errors = Vec::new();
        apply_positive!(self, patch, errors,
            alignment_weight => "alignmentWeight",
            cohesion_weight => "cohesionWeight",
            separation_weight => "separationWeight",
            perception_radius => "perceptionRadius",
            separation_radius => "separationRadius",
            boundary_margin => "boundaryMargin",
            boundary_force_multiplier => "boundaryForceMultiplier",
            boundary_force_ramp => "boundaryForceRamp",
            boundary_stuck_threshold_ms => "boundaryStuckThresholdMs",
            obstacle_perception_radius => "obstaclePerceptionRadius",
            obstacle_force_multiplier => "obstacleForceMultiplier",
            max_speed => "maxSpeed",
            max_force => "maxForce",
        );
        if let Some(mode) = patch.boundary_mode {
            self.boundary_mode = mode;
        }
        if let Some(population) = patch.max_population {
            if population == 0 {
                errors.push(ConfigError::NonPositive {
                    field: "maxPopulation",
                    value: 0.0,
                });
            } else {
                self.max_population = population;
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        for err in &errors {
            warn!("configuration change rejected: {err}");
        }
        Err(ConfigRejected { errors })
    }

    /// Checks every field of a complete configuration.
    ///
    /// # Errors
    /// Returns [`ConfigRejected`] listing each invalid field.
    pub fn validate(&self) -> Result<(), ConfigRejected> {
        let mut probe = Self::default();
        probe.apply(&ConfigPatch::from_config(self))
    }

    /// Movement limits implied by this configuration.
    #[must_use]
    pub const fn limits(&self) -> MovementLimits {
        MovementLimits {
            max_speed: self.max_speed,
            max_force: self.max_force,
            perception_radius: self.perception_radius,
        }
    }
}
