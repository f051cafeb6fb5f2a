//! # Motion control library
//!
//! This library is the control core of the rover's motion stack. It computes
//! time-optimal 1-D velocity/position trajectories (trapezoidal motion
//! profiles) and steers the rover along a 2-D path built from line and arc
//! segments.
//!
//! The library is split into three modules:
//!
//! - [`geom`] - 2-D geometry primitives: rotations, rigid transforms
//!   (SE(2)), and constant-curvature twists.
//! - [`motion`] - the 1-D motion profiling stack: motion states and
//!   segments, the trapezoidal profile generator, the setpoint generator and
//!   the PID + feedforward profile follower.
//! - [`path`] - the 2-D path following stack: line/arc path segments with
//!   distance-indexed speed profiles, the waypoint path builder, the adaptive
//!   pure pursuit steering controller and the combined path follower.
//!
//! All components are single threaded and tick driven: an external control
//! loop calls the update functions once per fixed period with a monotonically
//! non-decreasing timestamp. No component performs I/O or blocking.
//!
//! Invalid or unreachable results are signalled with the floating point NaN
//! sentinel rather than with errors, so that every per-tick call always
//! returns a usable-or-ignorable value. Callers treat NaN as "do not command
//! the actuator this tick". Fallible setup operations (parameter loading,
//! path building) return `Result` instead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod geom;
pub mod motion;
pub mod path;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Nominal tolerance for floating point comparisons throughout the crate.
pub const EPSILON: f64 = 1e-6;
