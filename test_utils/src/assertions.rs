//! Assertions over vectors and emitted events.

use boidworld::events::SimEvent;
use boidworld::vector_math::Vector2;

/// Assert that `actual` lies within `tolerance` of `expected`.
///
/// # Panics
/// Panics with both vectors if they are too far apart.
pub fn assert_vec_near(actual: Vector2, expected: Vector2, tolerance: f64) {
    let gap = actual.distance(expected);
    assert!(
        gap <= tolerance,
        "{actual:?} is {gap} away from {expected:?} (tolerance {tolerance})"
    );
}

/// Assert that every kind in `kinds` was emitted at least once.
///
/// # Panics
/// Panics naming the first missing kind.
pub fn assert_kinds_present(events: &[SimEvent], kinds: &[&str]) {
    for kind in kinds {
        assert!(
            events.iter().any(|event| event.kind() == *kind),
            "{kind} not found in emitted events"
        );
    }
}

/// Assert that no kind in `kinds` was emitted.
///
/// # Panics
/// Panics naming the first kind that was emitted.
pub fn assert_kinds_absent(events: &[SimEvent], kinds: &[&str]) {
    for kind in kinds {
        assert!(
            events.iter().all(|event| event.kind() != *kind),
            "{kind} should not have been emitted"
        );
    }
}
