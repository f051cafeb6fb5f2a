//! Constant curvature motion delta

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A movement along an arc of constant curvature, expressed in the frame of
/// the moving body.
///
/// `dx_m` is forward motion, `dy_m` sideways motion (zero for a non-holonomic
/// base) and `dtheta_rad` the change in heading. Scaling a twist by a factor
/// also turns it into a velocity command for that motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist2d {
    pub dx_m: f64,
    pub dy_m: f64,
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Twist2d {
    /// The zero twist.
    pub fn identity() -> Self {
        Self {
            dx_m: 0.0,
            dy_m: 0.0,
            dtheta_rad: 0.0,
        }
    }

    pub fn new(dx_m: f64, dy_m: f64, dtheta_rad: f64) -> Self {
        Self {
            dx_m,
            dy_m,
            dtheta_rad,
        }
    }

    /// Scale all components by a factor, for example a timestep.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            dx_m: self.dx_m * scale,
            dy_m: self.dy_m * scale,
            dtheta_rad: self.dtheta_rad * scale,
        }
    }
}
