//! Planar rotation stored as a direction vector

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal imports
use super::cross;
use util::maths::epsilon_equals;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rotation in the 2-D plane, stored as the cosine and sine of the angle
/// (a point on the unit circle).
///
/// Storing the direction vector rather than the angle avoids repeated
/// trigonometry when composing rotations and rotating vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation2d {
    cos: f64,
    sin: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rotation2d {
    /// The zero rotation.
    pub fn identity() -> Self {
        Self {
            cos: 1.0,
            sin: 0.0,
        }
    }

    /// Build a rotation from a raw `(cos, sin)` pair.
    ///
    /// If `normalize` is true the pair is scaled back onto the unit circle,
    /// with near-zero magnitude mapping to the identity.
    pub fn new(cos: f64, sin: f64, normalize: bool) -> Self {
        let mut rot = Self { cos, sin };

        if normalize {
            rot.normalize();
        }

        rot
    }

    /// Build a rotation from an angle in radians.
    pub fn from_radians(angle_rad: f64) -> Self {
        Self {
            cos: angle_rad.cos(),
            sin: angle_rad.sin(),
        }
    }

    /// Build a rotation pointing along the given vector.
    pub fn from_direction(direction: Vector2<f64>) -> Self {
        Self::new(direction[0], direction[1], true)
    }

    pub fn cos(&self) -> f64 {
        self.cos
    }

    pub fn sin(&self) -> f64 {
        self.sin
    }

    /// Tangent of the angle, with vertical directions giving an infinity of
    /// the appropriate sign.
    pub fn tan(&self) -> f64 {
        if self.cos.abs() < 1e-9 {
            if self.sin >= 0.0 {
                f64::INFINITY
            }
            else {
                f64::NEG_INFINITY
            }
        }
        else {
            self.sin / self.cos
        }
    }

    /// The angle in radians in `(-pi, pi]`.
    pub fn radians(&self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// Compose this rotation with another (angle addition).
    pub fn rotate_by(&self, other: &Rotation2d) -> Self {
        Self::new(
            self.cos * other.cos - self.sin * other.sin,
            self.cos * other.sin + self.sin * other.cos,
            true,
        )
    }

    /// The inverse rotation (angle negation).
    pub fn inverse(&self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }

    /// The rotation 90 degrees anticlockwise of this one.
    pub fn normal(&self) -> Self {
        Self {
            cos: -self.sin,
            sin: self.cos,
        }
    }

    /// The unit direction vector of this rotation.
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.cos, self.sin)
    }

    /// True if this rotation points along the same line as another (parallel
    /// or antiparallel).
    pub fn is_parallel(&self, other: &Rotation2d) -> bool {
        epsilon_equals(cross(&self.to_vector(), &other.to_vector()), 0.0, 1e-9)
    }

    /// Rotate a vector by this rotation.
    pub fn rotate_vector(&self, vector: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            vector[0] * self.cos - vector[1] * self.sin,
            vector[0] * self.sin + vector[1] * self.cos,
        )
    }

    /// Rescale onto the unit circle, mapping degenerate pairs to identity.
    fn normalize(&mut self) {
        let magnitude = (self.cos * self.cos + self.sin * self.sin).sqrt();

        if magnitude > 1e-9 {
            self.cos /= magnitude;
            self.sin /= magnitude;
        }
        else {
            self.cos = 1.0;
            self.sin = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
