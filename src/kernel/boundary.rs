//! Post-integration edge handling and stuck-escape tracking.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::agent::{Agent, AgentId};
use crate::behaviours::escape_force;
use crate::config::SimulationConfig;
use crate::events::{EventSink, SimEvent};
use crate::spatial::Rect;
use crate::world::{BoundaryMode, BoundarySide};

/// Open stuck-escape record for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StuckRecord {
    pub(crate) side: BoundarySide,
    pub(crate) since_ms: f64,
}

/// What happened to one agent at the edge this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct EdgeOutcome {
    pub(crate) wrapped: bool,
    pub(crate) escaped: bool,
}

/// Tracks agents lingering inside the boundary margin.
#[derive(Debug, Default)]
pub(crate) struct BoundaryTracker {
    records: HashMap<AgentId, StuckRecord>,
}

impl BoundaryTracker {
    pub(crate) fn forget(&mut self, id: AgentId) {
        self.records.remove(&id);
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    #[cfg(test)]
    pub(crate) fn record(&self, id: AgentId) -> Option<StuckRecord> {
        self.records.get(&id).copied()
    }

    /// Applies the configured edge rule to `agent` after it moved.
    ///
    /// `now_ms` is the simulated time at the end of the current tick.
    pub(crate) fn resolve<S: EventSink>(
        &mut self,
        agent: &mut Agent,
        bounds: &Rect,
        config: &SimulationConfig,
        now_ms: f64,
        sink: &mut S,
    ) -> EdgeOutcome {
        match config.boundary_mode {
            BoundaryMode::Wrappable => {
                self.forget(agent.id);
                EdgeOutcome {
                    wrapped: wrap(agent, bounds, sink),
                    escaped: false,
                }
            }
            BoundaryMode::Collidable => {
                clamp_inside(agent, bounds);
                EdgeOutcome {
                    wrapped: false,
                    escaped: self.track(agent, bounds, config, now_ms, sink),
                }
            }
        }
    }

    fn track<S: EventSink>(
        &mut self,
        agent: &mut Agent,
        bounds: &Rect,
        config: &SimulationConfig,
        now_ms: f64,
        sink: &mut S,
    ) -> bool {
        let Some(side) = BoundarySide::nearest_within(bounds, agent.position, config.boundary_margin)
        else {
            if self.records.remove(&agent.id).is_some() {
                trace!("{} left the boundary margin", agent.id);
            }
            return false;
        };

        match self.records.get_mut(&agent.id) {
            Some(record) if record.side == side => {
                let stuck_for = now_ms - record.since_ms;
                if stuck_for < config.boundary_stuck_threshold_ms {
                    return false;
                }
                let impulse = escape_force(agent, side, bounds);
                agent.apply_force(impulse);
                record.since_ms = now_ms;
                debug!("{} pinned against {side} for {stuck_for:.0}ms, escaping", agent.id);
                sink.emit(SimEvent::BoidUnstuck {
                    agent_id: agent.id,
                    boundary: side,
                    stuck_duration_ms: stuck_for,
                });
                true
            }
            _ => {
                self.records.insert(
                    agent.id,
                    StuckRecord {
                        side,
                        since_ms: now_ms,
                    },
                );
                sink.emit(SimEvent::BoundaryCollision {
                    agent_id: agent.id,
                    boundary: side,
                });
                false
            }
        }
    }
}

/// Pulls the agent back inside and cancels velocity pointing outward.
fn clamp_inside(agent: &mut Agent, bounds: &Rect) {
    let position = agent.position;
    if position.x < bounds.min.x {
        agent.velocity.x = agent.velocity.x.max(0.0);
    } else if position.x > bounds.max.x {
        agent.velocity.x = agent.velocity.x.min(0.0);
    }
    if position.y < bounds.min.y {
        agent.velocity.y = agent.velocity.y.max(0.0);
    } else if position.y > bounds.max.y {
        agent.velocity.y = agent.velocity.y.min(0.0);
    }
    agent.position = position.clamp(bounds.min, bounds.max);
}

/// Teleports an agent that left the world to the opposite edge.
fn wrap<S: EventSink>(agent: &mut Agent, bounds: &Rect, sink: &mut S) -> bool {
    if bounds.contains(agent.position) {
        return false;
    }
    let offset = agent.position - bounds.min;
    agent.position.x = bounds.min.x + offset.x.rem_euclid(bounds.width());
    agent.position.y = bounds.min.y + offset.y.rem_euclid(bounds.height());
    sink.emit(SimEvent::BoundaryWrapped {
        agent_id: agent.id,
        position: agent.position,
    });
    true
}
