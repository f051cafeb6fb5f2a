//! Rigid body transform in the plane

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal imports
use super::{Rotation2d, Twist2d};
use util::maths::epsilon_equals;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rigid body transform (pose) in the 2-D plane, an element of SE(2).
///
/// A pose is also used to represent an infinite directed line through its
/// translation along its rotation, for example when intersecting tangents
/// during path construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform2d {
    pub translation_m: Vector2<f64>,
    pub rotation: Rotation2d,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RigidTransform2d {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            translation_m: Vector2::new(0.0, 0.0),
            rotation: Rotation2d::identity(),
        }
    }

    pub fn new(translation_m: Vector2<f64>, rotation: Rotation2d) -> Self {
        Self {
            translation_m,
            rotation,
        }
    }

    /// Compose this transform with another, applying `other` in this
    /// transform's frame.
    pub fn transform_by(&self, other: &RigidTransform2d) -> Self {
        Self {
            translation_m: self.translation_m
                + self.rotation.rotate_vector(&other.translation_m),
            rotation: self.rotation.rotate_by(&other.rotation),
        }
    }

    /// The inverse transform, mapping from this pose's frame back to the
    /// frame the pose is expressed in.
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();

        Self {
            translation_m: inv_rotation.rotate_vector(&-self.translation_m),
            rotation: inv_rotation,
        }
    }

    /// The pose rotated 90 degrees anticlockwise about its own position.
    pub fn normal(&self) -> Self {
        Self {
            translation_m: self.translation_m,
            rotation: self.rotation.normal(),
        }
    }

    /// Intersection point of the lines defined by this pose and another.
    ///
    /// If the lines are parallel the point at infinity is returned.
    pub fn intersection(&self, other: &RigidTransform2d) -> Vector2<f64> {
        if self.rotation.is_parallel(&other.rotation) {
            // Lines never intersect
            return Vector2::new(f64::INFINITY, f64::INFINITY);
        }

        // Solve in the frame of the line closer to vertical, where the
        // tangent of the other line is better conditioned.
        if self.rotation.cos().abs() < other.rotation.cos().abs() {
            Self::intersection_internal(self, other)
        }
        else {
            Self::intersection_internal(other, self)
        }
    }

    /// True if another pose lies on the line through this pose, pointing the
    /// same way.
    pub fn is_colinear(&self, other: &RigidTransform2d) -> bool {
        let twist = Self::log(&self.inverse().transform_by(other));

        epsilon_equals(twist.dy_m, 0.0, 1e-9)
            && epsilon_equals(twist.dtheta_rad, 0.0, 1e-9)
    }

    /// Exponential map: the pose reached by following a twist from identity.
    pub fn exp(delta: &Twist2d) -> Self {
        let sin_theta = delta.dtheta_rad.sin();
        let cos_theta = delta.dtheta_rad.cos();

        // Small angle Taylor expansions of sin(t)/t and (1 - cos(t))/t
        let (s, c) = if delta.dtheta_rad.abs() < 1e-9 {
            (
                1.0 - delta.dtheta_rad * delta.dtheta_rad / 6.0,
                0.5 * delta.dtheta_rad,
            )
        }
        else {
            (
                sin_theta / delta.dtheta_rad,
                (1.0 - cos_theta) / delta.dtheta_rad,
            )
        };

        Self {
            translation_m: Vector2::new(
                delta.dx_m * s - delta.dy_m * c,
                delta.dx_m * c + delta.dy_m * s,
            ),
            rotation: Rotation2d::new(cos_theta, sin_theta, false),
        }
    }

    /// Logarithmic map: the twist which takes identity to the given pose.
    pub fn log(transform: &RigidTransform2d) -> Twist2d {
        let dtheta_rad = transform.rotation.radians();
        let half_dtheta = 0.5 * dtheta_rad;
        let cos_minus_one = transform.rotation.cos() - 1.0;

        let halftheta_by_tan_of_halfdtheta = if cos_minus_one.abs() < 1e-9 {
            1.0 - dtheta_rad * dtheta_rad / 12.0
        }
        else {
            -(half_dtheta * transform.rotation.sin()) / cos_minus_one
        };

        let translation = Rotation2d::new(
            halftheta_by_tan_of_halfdtheta,
            -half_dtheta,
            false,
        )
        .rotate_vector(&transform.translation_m);

        Twist2d::new(translation[0], translation[1], dtheta_rad)
    }

    /// Intersection with `a` the line closer to vertical.
    fn intersection_internal(
        a: &RigidTransform2d,
        b: &RigidTransform2d,
    ) -> Vector2<f64> {
        let tangent = b.rotation.tan();
        let scale = ((a.translation_m[0] - b.translation_m[0]) * tangent
            + b.translation_m[1]
            - a.translation_m[1])
            / (a.rotation.sin() - a.rotation.cos() * tangent);

        a.translation_m + a.rotation.to_vector() * scale
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
    use util::maths::epsilon_equals;

    #[test]
    fn test_transform_by_and_inverse() {
        let pose = RigidTransform2d::new(
            Vector2::new(1.0, 2.0),
            Rotation2d::from_radians(FRAC_PI_2),
        );
        let step = RigidTransform2d::new(
            Vector2::new(1.0, 0.0),
            Rotation2d::identity(),
        );

        // Stepping forward from a pose facing +y moves along +y
        let moved = pose.transform_by(&step);
        assert!(epsilon_equals(moved.translation_m[0], 1.0, 1e-9));
        assert!(epsilon_equals(moved.translation_m[1], 3.0, 1e-9));

        // A pose composed with its inverse is identity
        let ident = pose.transform_by(&pose.inverse());
        assert!(epsilon_equals(ident.translation_m.norm(), 0.0, 1e-9));
        assert!(epsilon_equals(ident.rotation.radians(), 0.0, 1e-9));
    }

    #[test]
    fn test_intersection() {
        // A line along +x from the origin and a line along +y from (2, -1)
        // meet at (2, 0)
        let a = RigidTransform2d::new(
            Vector2::new(0.0, 0.0),
            Rotation2d::identity(),
        );
        let b = RigidTransform2d::new(
            Vector2::new(2.0, -1.0),
            Rotation2d::from_radians(FRAC_PI_2),
        );

        let point = a.intersection(&b);
        assert!(epsilon_equals(point[0], 2.0, 1e-9));
        assert!(epsilon_equals(point[1], 0.0, 1e-9));

        // 45 degree lines from (0,0) and (1,0) meet at (0.5, ...)
        let c = RigidTransform2d::new(
            Vector2::new(0.0, 0.0),
            Rotation2d::from_radians(FRAC_PI_4),
        );
        let d = RigidTransform2d::new(
            Vector2::new(1.0, 0.0),
            Rotation2d::from_radians(3.0 * FRAC_PI_4),
        );

        let point = c.intersection(&d);
        assert!(epsilon_equals(point[0], 0.5, 1e-9));
        assert!(epsilon_equals(point[1], 0.5, 1e-9));

        // Parallel lines give the point at infinity
        let e = RigidTransform2d::new(
            Vector2::new(0.0, 1.0),
            Rotation2d::identity(),
        );
        assert!(a.intersection(&e)[0].is_infinite());
    }

    #[test]
    fn test_exp_log_round_trip() {
        let twist = Twist2d::new(1.0, 0.0, FRAC_PI_2);

        let pose = RigidTransform2d::exp(&twist);
        let recovered = RigidTransform2d::log(&pose);

        assert!(epsilon_equals(recovered.dx_m, twist.dx_m, 1e-9));
        assert!(epsilon_equals(recovered.dy_m, twist.dy_m, 1e-9));
        assert!(epsilon_equals(recovered.dtheta_rad, twist.dtheta_rad, 1e-9));

        // Pure translation is unchanged by exp
        let straight = RigidTransform2d::exp(&Twist2d::new(2.0, 0.0, 0.0));
        assert!(epsilon_equals(straight.translation_m[0], 2.0, 1e-9));
        assert!(epsilon_equals(straight.translation_m[1], 0.0, 1e-9));
    }

    #[test]
    fn test_is_colinear() {
        let a = RigidTransform2d::new(
            Vector2::new(0.0, 0.0),
            Rotation2d::identity(),
        );
        let ahead = RigidTransform2d::new(
            Vector2::new(3.0, 0.0),
            Rotation2d::identity(),
        );
        let offset = RigidTransform2d::new(
            Vector2::new(3.0, 0.1),
            Rotation2d::identity(),
        );

        assert!(a.is_colinear(&ahead));
        assert!(!a.is_colinear(&offset));
    }
}
