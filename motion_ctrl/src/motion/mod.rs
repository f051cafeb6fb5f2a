//! # 1-D motion profiling
//!
//! Plans and follows time-optimal 1-D trajectories under velocity and
//! acceleration constraints.
//!
//! The stack is layered bottom-up:
//!
//! - [`MotionState`] and [`MotionSegment`] describe constant acceleration
//!   motion.
//! - [`MotionProfile`] chains segments into a trajectory and supports
//!   sampling and trimming.
//! - [`generate_profile`] synthesises a trapezoidal profile for a
//!   [`MotionProfileGoal`] under [`MotionProfileConstraints`].
//! - [`SetpointGenerator`] samples a cached profile one state per tick,
//!   regenerating it when the goal, constraints or actual state change.
//! - [`ProfileFollower`] closes the loop, turning setpoints into output
//!   commands with PID feedback and feedforward.
//!
//! Queries that have no answer (sampling outside a profile, unreachable
//! positions) return [`MotionState::INVALID`], whose components are NaN.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod follower;
mod generator;
mod goal;
mod profile;
mod segment;
mod setpoint;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use follower::{ProfileFollower, ProfileFollowerGains};
pub use generator::{generate_flipped_profile, generate_profile};
pub use goal::{
    CompletionBehavior, MotionProfileConstraints, MotionProfileGoal,
};
pub use profile::MotionProfile;
pub use segment::MotionSegment;
pub use setpoint::{Setpoint, SetpointGenerator};
pub use state::MotionState;
