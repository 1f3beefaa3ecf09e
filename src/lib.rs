//! Library crate providing the boidworld simulation kernel.
//! Re-exports the agent model, steering behaviours and kernel types for the
//! host binary and tests.
pub mod agent;
pub mod behaviours;
pub mod config;
pub mod constants;
pub mod events;
pub mod factory;
pub mod kernel;
pub mod logging;
pub mod numeric;
pub mod spatial;
pub mod vector_math;
pub mod world;
pub use constants::*;

// Re-export commonly used items
pub use agent::{Agent, AgentId, AttackStats, BioStats, MovementLimits, Role, Sex, Variant};
pub use behaviours::{CompositeBehaviour, Neighbour, SteeringBehaviour, SteeringContext};
pub use config::{ConfigError, ConfigPatch, ConfigRejected, SimulationConfig};
pub use events::{EventBuffer, EventSink, LogSink, NullSink, SimEvent};
pub use factory::{AgentFactory, FlockFactory, SpawnRequest};
pub use kernel::{KernelError, SimulationKernel, TickSummary};
pub use logging::init as init_logging;
pub use spatial::{Quadtree, Rect, SpatialIndex};
pub use vector_math::{vec_mag, Vector2, VectorExt};
pub use world::{BoundaryMode, BoundarySide, Obstacle};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use boidworld::prelude::*;
    //! ```

    pub use crate::agent::{Agent, AgentId, Variant};
    pub use crate::config::{ConfigPatch, SimulationConfig};
    pub use crate::events::{EventBuffer, EventSink, SimEvent};
    pub use crate::kernel::{SimulationKernel, TickSummary};
    pub use crate::vector_math::{Vector2, VectorExt};
    pub use crate::world::{BoundaryMode, Obstacle};
}
