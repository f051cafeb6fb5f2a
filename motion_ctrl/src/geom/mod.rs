//! # 2-D geometry primitives
//!
//! Provides the planar geometry types used by the path following stack:
//! [`Rotation2d`] (a rotation stored as a unit direction vector),
//! [`RigidTransform2d`] (a pose in SE(2)) and [`Twist2d`] (a constant
//! curvature motion delta), along with a few free functions on plain
//! translation vectors.
//!
//! Translations are represented directly as `nalgebra::Vector2<f64>`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod rotation;
mod transform;
mod twist;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use rotation::Rotation2d;
pub use transform::RigidTransform2d;
pub use twist::Twist2d;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// 2-D cross product (the z component of the 3-D cross product).
///
/// The sign gives the winding of `b` relative to `a`: positive if `b` is
/// anticlockwise of `a`.
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

/// Unsigned angle between two vectors in radians.
///
/// Returns zero if either vector is degenerate.
pub fn angle_between(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let cos_angle = a.dot(b) / (a.norm() * b.norm());

    if cos_angle.is_nan() {
        0.0
    }
    else {
        cos_angle.max(-1.0).min(1.0).acos()
    }
}

/// Linearly interpolate between two points.
///
/// The scale factor is clamped into `[0, 1]`, so values outside that range
/// return the corresponding endpoint.
pub fn interpolate(
    start: &Vector2<f64>,
    end: &Vector2<f64>,
    scale: f64
) -> Vector2<f64> {
    if scale <= 0.0 {
        *start
    }
    else if scale >= 1.0 {
        *end
    }
    else {
        start + (end - start) * scale
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use util::maths::epsilon_equals;

    #[test]
    fn test_cross() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 1.0);

        assert!(epsilon_equals(cross(&x, &y), 1.0, 1e-9));
        assert!(epsilon_equals(cross(&y, &x), -1.0, 1e-9));
        assert!(epsilon_equals(cross(&x, &x), 0.0, 1e-9));
    }

    #[test]
    fn test_angle_between() {
        let x = Vector2::new(2.0, 0.0);
        let y = Vector2::new(0.0, 0.5);
        let neg_x = Vector2::new(-3.0, 0.0);
        let zero = Vector2::new(0.0, 0.0);

        assert!(epsilon_equals(
            angle_between(&x, &y),
            std::f64::consts::FRAC_PI_2,
            1e-9
        ));
        assert!(epsilon_equals(
            angle_between(&x, &neg_x),
            std::f64::consts::PI,
            1e-9
        ));

        // Degenerate inputs give zero, not NaN
        assert!(epsilon_equals(angle_between(&x, &zero), 0.0, 1e-9));
    }

    #[test]
    fn test_interpolate() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(2.0, 4.0);

        let mid = interpolate(&a, &b, 0.5);
        assert!(epsilon_equals(mid[0], 1.0, 1e-9));
        assert!(epsilon_equals(mid[1], 2.0, 1e-9));

        // Out of range scales clamp to the endpoints
        assert_eq!(interpolate(&a, &b, -1.0), a);
        assert_eq!(interpolate(&a, &b, 2.0), b);
    }
}
