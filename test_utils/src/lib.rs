//! Utility helpers for tests.
pub mod agents;
pub mod assertions;

pub use agents::{agent_at, predator_at, prey_at, ring_of};
pub use assertions::{assert_kinds_absent, assert_kinds_present, assert_vec_near};
