//! Basic vector math helpers.
//! Steering arithmetic on top of `glam`'s double-precision 2D vector.
use glam::DVec2;

use crate::VECTOR_EPSILON;

/// 2D vector used for positions, velocities and forces.
pub type Vector2 = DVec2;

/// Steering-specific operations missing from `glam`.
///
/// Every operation treats non-finite input as the zero vector so a single
/// poisoned agent cannot spread `NaN` through the flock.
pub trait VectorExt: Sized {
    /// Returns the unit vector in the same direction, or zero.
    ///
    /// # Examples
    /// ```
    /// use boidworld::vector_math::{Vector2, VectorExt};
    /// let unit = Vector2::new(3.0, 4.0).normalized();
    /// assert!((unit.x - 0.6).abs() < 1e-12);
    /// assert_eq!(Vector2::new(f64::NAN, 1.0).normalized(), Vector2::ZERO);
    /// ```
    #[must_use]
    fn normalized(self) -> Self;

    /// Clamps the length to `max`, keeping the direction.
    #[must_use]
    fn limit(self, max: f64) -> Self;

    /// Rescales to exactly `length`, or zero when the direction is undefined.
    #[must_use]
    fn with_length(self, length: f64) -> Self;

    /// Whether the vector is too short to carry a direction.
    #[must_use]
    fn is_negligible(self) -> bool;
}

impl VectorExt for Vector2 {
    fn normalized(self) -> Self {
        if self.is_negligible() {
            return Self::ZERO;
        }
        self / self.length()
    }

    fn limit(self, max: f64) -> Self {
        if !self.is_finite() || !max.is_finite() || max <= 0.0 {
            return Self::ZERO;
        }
        let length_sq = self.length_squared();
        if length_sq > max * max {
            self * (max / length_sq.sqrt())
        } else {
            self
        }
    }

    fn with_length(self, length: f64) -> Self {
        self.normalized() * length
    }

    fn is_negligible(self) -> bool {
        !self.is_finite() || self.length() < VECTOR_EPSILON
    }
}

/// Returns the magnitude of a vector expressed by its components.
///
/// # Examples
/// ```
/// use boidworld::vector_math::vec_mag;
/// assert!((vec_mag(3.0, 4.0) - 5.0).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn vec_mag(component_x: f64, component_y: f64) -> f64 {
    Vector2::new(component_x, component_y).length()
}
