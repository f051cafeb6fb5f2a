//! Building paths from waypoint lists

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal imports
use super::{Path, PathSegment};
use crate::geom::{RigidTransform2d, Rotation2d};
use crate::motion::MotionState;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Corner radii outside this range degenerate to a sharp corner.
const MIN_ARC_RADIUS_M: f64 = 1e-9;
const MAX_ARC_RADIUS_M: f64 = 1e9;

/// Lines shorter than this are dropped rather than built.
const MIN_LINE_LENGTH_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A waypoint of a path: a position to pass, the radius of the arc used to
/// round the corner at it, and the speed to travel at on the way in.
///
/// A zero radius gives a sharp corner. The radius of the first and last
/// waypoints is ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Waypoint {
    pub position_m: Vector2<f64>,
    pub radius_m: f64,
    pub speed_ms: f64,
}

/// Straight run between two waypoints, trimmed by their corner radii.
struct Line {
    start_m: Vector2<f64>,
    end_m: Vector2<f64>,
    slope_m: Vector2<f64>,
    speed_ms: f64,
}

/// Corner arc joining the trimmed lines either side of a waypoint.
struct Arc {
    line_a: Line,
    line_b: Line,
    center_m: Vector2<f64>,
    radius_m: f64,
    speed_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors from building a path out of waypoints.
#[derive(Debug, Error)]
pub enum PathBuildError {
    #[error("A path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("All waypoints are coincident, the path has no length")]
    EmptyPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64, radius_m: f64, speed_ms: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            radius_m,
            speed_ms,
        }
    }
}

impl Line {
    /// The line from `a` to `b`, pulled in at each end by that waypoint's
    /// corner radius.
    fn new(a: &Waypoint, b: &Waypoint) -> Self {
        let delta = b.position_m - a.position_m;
        let norm = delta.norm();

        let slope_m = if norm > MIN_LINE_LENGTH_M {
            delta / norm
        }
        else {
            Vector2::new(0.0, 0.0)
        };

        Self {
            start_m: a.position_m + slope_m * a.radius_m,
            end_m: b.position_m - slope_m * b.radius_m,
            slope_m,
            speed_ms: b.speed_ms,
        }
    }
}

impl Arc {
    /// The corner arc at waypoint `b`, tangent to the trimmed lines a->b
    /// and b->c.
    fn new(a: &Waypoint, b: &Waypoint, c: &Waypoint) -> Self {
        let line_a = Line::new(a, b);
        let line_b = Line::new(b, c);

        // The arc center is where the normals at the two tangent points
        // meet
        let center_m = intersect_normals(&line_a, &line_b);
        let radius_m = (line_a.end_m - center_m).norm();
        let speed_ms = 0.5 * (line_a.speed_ms + line_b.speed_ms);

        Self {
            line_a,
            line_b,
            center_m,
            radius_m,
            speed_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a drivable path through the given waypoints.
///
/// Corners at interior waypoints with a non-zero radius are rounded with
/// tangent arcs; the straight runs between them become line segments. The
/// speed plan accelerates within `max_accel_mss` towards each waypoint's
/// speed and comes to rest at the final waypoint.
pub fn build_path_from_waypoints(
    waypoints: &[Waypoint],
    max_accel_mss: f64,
) -> Result<Path, PathBuildError> {
    if waypoints.len() < 2 {
        return Err(PathBuildError::TooFewWaypoints(waypoints.len()));
    }

    let mut segments: Vec<PathSegment> = Vec::new();

    for window in waypoints.windows(3) {
        let arc = Arc::new(&window[0], &window[1], &window[2]);

        if (arc.line_a.end_m - arc.line_a.start_m).norm() > MIN_LINE_LENGTH_M {
            let start_state = last_state(&segments);

            segments.push(PathSegment::new_line(
                arc.line_a.start_m,
                arc.line_a.end_m,
                arc.line_a.speed_ms,
                &start_state,
                arc.speed_ms,
                max_accel_mss,
            ));
        }

        if arc.radius_m > MIN_ARC_RADIUS_M && arc.radius_m < MAX_ARC_RADIUS_M {
            let start_state = last_state(&segments);

            segments.push(PathSegment::new_arc(
                arc.line_a.end_m,
                arc.line_b.start_m,
                arc.center_m,
                arc.speed_ms,
                &start_state,
                arc.line_b.speed_ms,
                max_accel_mss,
            ));
        }
    }

    // The final run always ends at rest
    let last_line = Line::new(
        &waypoints[waypoints.len() - 2],
        &waypoints[waypoints.len() - 1],
    );

    if (last_line.end_m - last_line.start_m).norm() > MIN_LINE_LENGTH_M {
        let start_state = last_state(&segments);

        segments.push(PathSegment::new_line(
            last_line.start_m,
            last_line.end_m,
            last_line.speed_ms,
            &start_state,
            0.0,
            max_accel_mss,
        ));
    }

    if segments.is_empty() {
        return Err(PathBuildError::EmptyPath);
    }

    Ok(Path::from_segments(segments))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Intersection of the perpendiculars at the lines' tangent points.
fn intersect_normals(line_a: &Line, line_b: &Line) -> Vector2<f64> {
    let normal_a = RigidTransform2d::new(
        line_a.end_m,
        Rotation2d::from_direction(line_a.slope_m).normal(),
    );
    let normal_b = RigidTransform2d::new(
        line_b.start_m,
        Rotation2d::from_direction(line_b.slope_m).normal(),
    );

    normal_a.intersection(&normal_b)
}

/// Seed state for the next segment's speed profile, re-anchored at zero.
fn last_state(segments: &[PathSegment]) -> MotionState {
    match segments.last() {
        Some(last) => {
            let end = last.end_state();
            MotionState::new(0.0, 0.0, end.vel, end.acc)
        }
        None => MotionState::new(0.0, 0.0, 0.0, 0.0),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
