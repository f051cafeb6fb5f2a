//! # 2-D path following
//!
//! Builds drivable paths out of waypoints and steers the rover along them.
//!
//! A [`Path`] is a queue of [`PathSegment`]s (lines and corner-rounding
//! arcs), each carrying a speed profile over its length. The
//! [`AdaptivePurePursuitController`] picks a lookahead point on the path
//! and shapes the arc to reach it; the [`PathFollower`] couples that arc
//! with a velocity profile follower to produce the twist commanded to the
//! locomotion system each tick.
//!
//! Positions are metres in the world frame, speeds metres per second.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod builder;
mod follower;
mod lookahead;
#[allow(clippy::module_inception)]
mod path;
mod pure_pursuit;
mod segment;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use builder::{build_path_from_waypoints, PathBuildError, Waypoint};
pub use follower::{PathFollower, PathFollowerParams};
pub use lookahead::Lookahead;
pub use path::{Path, TargetPoint};
pub use pure_pursuit::{AdaptivePurePursuitController, SteeringCommand};
pub use segment::PathSegment;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance from the end of the active segment below which it counts as
/// complete and the next segment takes over.
pub const SEGMENT_COMPLETION_TOLERANCE_M: f64 = 0.1;

/// Radii and curvature magnitudes beyond this are treated as straight line
/// motion.
pub(crate) const REALLY_BIG_NUMBER: f64 = 1e6;
