//! Simulation tuning constants shared across the kernel and behaviours.
//!
//! Values that a host may reasonably want to change between ticks live in
//! [`SimulationConfig`](crate::config::SimulationConfig); these are the fixed
//! rules of the ecosystem.

/// Upper bound for health, stamina and reproduction progress.
pub const STAT_MAX: f64 = 100.0;
/// Milliseconds in one reference frame. Velocities are expressed per frame.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
/// Lengths below this are treated as zero when normalising.
pub const VECTOR_EPSILON: f64 = 1e-9;

/// Default number of points a quadtree leaf holds before splitting.
pub const QUADTREE_CAPACITY: usize = 4;
/// Default depth beyond which quadtree leaves overflow instead of splitting.
pub const QUADTREE_MAX_DEPTH: usize = 8;

/// Completed reproduction cycles allowed for prey.
pub const PREY_REPRODUCTION_CAP: u32 = 3;
/// Completed reproduction cycles allowed for predators.
pub const PREDATOR_REPRODUCTION_CAP: u32 = 5;

/// Stamina drained per simulated second at full speed.
pub const STAMINA_DRAIN_PER_SECOND: f64 = 4.0;
/// Time an agent must spend at zero stamina before recovery starts.
pub const STAMINA_RECOVERY_DELAY_MS: f64 = 3000.0;
/// Stamina regained per simulated second once recovery starts.
pub const STAMINA_RECOVERY_PER_SECOND: f64 = 20.0;
/// Max-speed factor applied while stamina is depleted.
pub const DEPLETED_SPEED_FACTOR: f64 = 0.5;

/// Default damage dealt by a predator strike.
pub const DEFAULT_ATTACK_DAMAGE: f64 = 20.0;
/// Default distance within which a predator can strike.
pub const DEFAULT_ATTACK_RANGE: f64 = 12.0;
/// Default delay between two strikes of the same predator.
pub const DEFAULT_ATTACK_COOLDOWN_MS: f64 = 1000.0;
/// Share of the victim's max health credited to the killer's reproduction.
pub const KILL_REPRODUCTION_FACTOR: f64 = 0.5;

/// Distance within which two partners make reproduction progress.
pub const MATING_DISTANCE: f64 = 20.0;
/// Reproduction progress gained per simulated second while mating.
pub const MATING_PROGRESS_PER_SECOND: f64 = 25.0;
/// Maximum offset of an offspring from its spawn point on each axis.
pub const OFFSPRING_JITTER: f64 = 5.0;

/// Radius multiplier for prey detecting predators.
pub const EVASION_RADIUS_FACTOR: f64 = 1.5;
/// Desired-speed multiplier for prey fleeing predators.
pub const EVASION_SPEED_FACTOR: f64 = 1.2;
/// Force-limit multiplier for prey fleeing predators.
pub const EVASION_FORCE_FACTOR: f64 = 3.0;
/// Radius multiplier for predators looking for prey.
pub const HUNTING_RADIUS_FACTOR: f64 = 2.0;
/// Desired-speed multiplier for predators chasing prey.
pub const HUNTING_SPEED_FACTOR: f64 = 1.1;
/// Force-limit multiplier for predators chasing prey.
pub const HUNTING_FORCE_FACTOR: f64 = 1.5;

/// Corner push toward the world centre, in multiples of max speed.
pub const CORNER_FORCE_FACTOR: f64 = 1.5;
/// Stuck-escape impulse, in multiples of max speed.
pub const ESCAPE_FORCE_FACTOR: f64 = 2.0;
/// Lateral speed below which the escape direction aims at the world centre.
pub const ESCAPE_LATERAL_THRESHOLD: f64 = 0.1;
