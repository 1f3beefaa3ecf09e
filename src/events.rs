//! Domain events and the sinks that receive them.
//!
//! The kernel reports every state transition through an [`EventSink`]. Sinks
//! must accept events immediately: emission never blocks and is never
//! retried.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::vector_math::Vector2;
use crate::world::BoundarySide;

/// A state transition observed during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SimEvent {
    /// An agent lost health.
    BoidDamaged {
        /// Victim.
        agent_id: AgentId,
        /// Health removed.
        damage: f64,
        /// Health left afterwards.
        remaining_health: f64,
    },
    /// An agent left the flock.
    BoidRemoved {
        /// Removed agent.
        agent_id: AgentId,
    },
    /// An agent entered the margin of a collidable edge.
    BoundaryCollision {
        /// Agent near the edge.
        agent_id: AgentId,
        /// Edge that was reached.
        boundary: BoundarySide,
    },
    /// An agent crossed a wrappable edge and re-entered opposite.
    BoundaryWrapped {
        /// Teleported agent.
        agent_id: AgentId,
        /// Position after wrapping.
        position: Vector2,
    },
    /// An escape impulse freed an agent pinned against an edge.
    BoidUnstuck {
        /// Freed agent.
        agent_id: AgentId,
        /// Edge the agent was pinned against.
        boundary: BoundarySide,
        /// Time spent pinned before the impulse.
        stuck_duration_ms: f64,
    },
    /// A reproduction cycle produced an offspring.
    BoidReproduced {
        /// Parent whose cycle completed first.
        parent1: AgentId,
        /// Mate, absent for kill-driven births.
        parent2: Option<AgentId>,
        /// The newborn.
        offspring: AgentId,
    },
    /// Stamina ran out.
    BoidStaminaDepleted {
        /// Exhausted agent.
        agent_id: AgentId,
    },
    /// Stamina refilled after depletion.
    BoidStaminaRecovered {
        /// Rested agent.
        agent_id: AgentId,
    },
    /// The world rectangle changed size.
    WorldBoundsChanged {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
}

impl SimEvent {
    /// Kebab-case event name, matching the serialised `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BoidDamaged { .. } => "boid-damaged",
            Self::BoidRemoved { .. } => "boid-removed",
            Self::BoundaryCollision { .. } => "boundary-collision",
            Self::BoundaryWrapped { .. } => "boundary-wrapped",
            Self::BoidUnstuck { .. } => "boid-unstuck",
            Self::BoidReproduced { .. } => "boid-reproduced",
            Self::BoidStaminaDepleted { .. } => "boid-stamina-depleted",
            Self::BoidStaminaRecovered { .. } => "boid-stamina-recovered",
            Self::WorldBoundsChanged { .. } => "world-bounds-changed",
        }
    }

    /// The agent the event concerns, if any.
    #[must_use]
    pub const fn agent_id(&self) -> Option<AgentId> {
        match self {
            Self::BoidDamaged { agent_id, .. }
            | Self::BoidRemoved { agent_id }
            | Self::BoundaryCollision { agent_id, .. }
            | Self::BoundaryWrapped { agent_id, .. }
            | Self::BoidUnstuck { agent_id, .. }
            | Self::BoidStaminaDepleted { agent_id }
            | Self::BoidStaminaRecovered { agent_id } => Some(*agent_id),
            Self::BoidReproduced { offspring, .. } => Some(*offspring),
            Self::WorldBoundsChanged { .. } => None,
        }
    }
}

/// Receiver of domain events.
pub trait EventSink: Send {
    /// Accepts one event.
    fn emit(&mut self, event: SimEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SimEvent) {
        (**self).emit(event);
    }
}

impl EventSink for Box<dyn EventSink> {
    fn emit(&mut self, event: SimEvent) {
        (**self).emit(event);
    }
}

/// In-memory queue drained by the host between ticks.
#[derive(Debug, Default, Clone)]
pub struct EventBuffer {
    events: Vec<SimEvent>,
}

impl EventBuffer {
    /// An empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends one event.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Removes and returns every queued event in emission order.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queued events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queued events with the given [`SimEvent::kind`].
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SimEvent> + 'a {
        self.events.iter().filter(move |event| event.kind() == kind)
    }
}

impl Extend<SimEvent> for EventBuffer {
    fn extend<T: IntoIterator<Item = SimEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl EventSink for EventBuffer {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _: SimEvent) {}
}

/// Writes every event to the log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: SimEvent) {
        debug!("{}: {event:?}", event.kind());
    }
}
