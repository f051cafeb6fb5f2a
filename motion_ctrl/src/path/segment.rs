//! Line and arc path segments with distance-indexed speed profiles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::error;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal imports
use crate::geom::{self, Rotation2d};
use crate::motion::{
    generate_profile, MotionProfile, MotionProfileConstraints,
    MotionProfileGoal, MotionState,
};
use util::maths::sign_num;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The shape of a path segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum SegmentGeometry {
    Line {
        /// End minus start.
        delta_m: Vector2<f64>,
    },
    Arc {
        center_m: Vector2<f64>,
        /// Start minus center.
        delta_start_m: Vector2<f64>,
        /// End minus center.
        delta_end_m: Vector2<f64>,
    },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single piece of a path: a straight line or a circular arc of at most a
/// half turn, together with a speed profile over its arc length.
///
/// The speed profile maps distance along the segment to speed, so the
/// follower can slow into corners and stop at the path end. It is generated
/// with the same trapezoidal machinery as the 1-D motion stack, reusing the
/// previous segment's end state so speeds are continuous across joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSegment {
    start_m: Vector2<f64>,
    end_m: Vector2<f64>,
    geometry: SegmentGeometry,
    max_speed_ms: f64,
    extrapolate_lookahead: bool,
    speed_profile: MotionProfile,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSegment {
    /// Build a straight line segment.
    pub fn new_line(
        start_m: Vector2<f64>,
        end_m: Vector2<f64>,
        max_speed_ms: f64,
        start_state: &MotionState,
        end_speed_ms: f64,
        max_accel_mss: f64,
    ) -> Self {
        let mut segment = Self {
            start_m,
            end_m,
            geometry: SegmentGeometry::Line {
                delta_m: end_m - start_m,
            },
            max_speed_ms,
            extrapolate_lookahead: false,
            speed_profile: MotionProfile::new(),
        };

        segment.create_speed_profile(start_state, end_speed_ms, max_accel_mss);
        segment
    }

    /// Build an arc segment from its endpoints and center.
    pub fn new_arc(
        start_m: Vector2<f64>,
        end_m: Vector2<f64>,
        center_m: Vector2<f64>,
        max_speed_ms: f64,
        start_state: &MotionState,
        end_speed_ms: f64,
        max_accel_mss: f64,
    ) -> Self {
        let mut segment = Self {
            start_m,
            end_m,
            geometry: SegmentGeometry::Arc {
                center_m,
                delta_start_m: start_m - center_m,
                delta_end_m: end_m - center_m,
            },
            max_speed_ms,
            extrapolate_lookahead: false,
            speed_profile: MotionProfile::new(),
        };

        segment.create_speed_profile(start_state, end_speed_ms, max_accel_mss);
        segment
    }

    pub fn start_m(&self) -> Vector2<f64> {
        self.start_m
    }

    pub fn end_m(&self) -> Vector2<f64> {
        self.end_m
    }

    pub fn is_line(&self) -> bool {
        matches!(self.geometry, SegmentGeometry::Line { .. })
    }

    pub fn max_speed_ms(&self) -> f64 {
        self.max_speed_ms
    }

    /// Allow lookahead points beyond the end of this segment.
    ///
    /// Set on the last segment of a path so the lookahead point can lead the
    /// rover all the way through the endpoint.
    pub fn set_extrapolate_lookahead(&mut self, extrapolate: bool) {
        self.extrapolate_lookahead = extrapolate;
    }

    /// Arc length of the segment.
    pub fn length_m(&self) -> f64 {
        match &self.geometry {
            SegmentGeometry::Line { delta_m } => delta_m.norm(),
            SegmentGeometry::Arc {
                delta_start_m,
                delta_end_m,
                ..
            } => {
                delta_start_m.norm()
                    * geom::angle_between(delta_start_m, delta_end_m)
            }
        }
    }

    /// The point on the segment closest to `position_m`.
    pub fn closest_point(&self, position_m: &Vector2<f64>) -> Vector2<f64> {
        match &self.geometry {
            SegmentGeometry::Line { delta_m } => {
                let length_sqr = delta_m.norm_squared();

                if length_sqr < 1e-12 {
                    return self.start_m;
                }

                // Project onto the line and clamp into the segment
                let u = ((position_m - self.start_m).dot(delta_m)
                    / length_sqr)
                    .max(0.0)
                    .min(1.0);

                self.start_m + delta_m * u
            }
            SegmentGeometry::Arc {
                center_m,
                delta_start_m,
                delta_end_m,
            } => {
                let delta_pos = position_m - center_m;
                let magnitude = delta_pos.norm();

                if magnitude < 1e-9 {
                    // At the center every arc point is equally close
                    return self.start_m;
                }

                // Radially project onto the circle
                let on_circle =
                    delta_pos * (delta_start_m.norm() / magnitude);

                // The projection is on the arc iff it lies angularly between
                // the endpoints, which flips the sign of the cross products
                if geom::cross(&on_circle, delta_start_m)
                    * geom::cross(&on_circle, delta_end_m)
                    < 0.0
                {
                    center_m + on_circle
                }
                else if (self.start_m - position_m).norm()
                    < (self.end_m - position_m).norm()
                {
                    self.start_m
                }
                else {
                    self.end_m
                }
            }
        }
    }

    /// The point `distance_m` along the segment from its start.
    ///
    /// Distances beyond the segment length are clamped unless lookahead
    /// extrapolation is enabled.
    pub fn point_by_distance(&self, distance_m: f64) -> Vector2<f64> {
        let length_m = self.length_m();
        let distance_m = if !self.extrapolate_lookahead && distance_m > length_m
        {
            length_m
        }
        else {
            distance_m
        };

        match &self.geometry {
            SegmentGeometry::Line { delta_m } => {
                if length_m < 1e-9 {
                    return self.start_m;
                }

                self.start_m + delta_m * (distance_m / length_m)
            }
            SegmentGeometry::Arc {
                center_m,
                delta_start_m,
                delta_end_m,
            } => {
                if length_m < 1e-9 {
                    return self.start_m;
                }

                let delta_angle_rad =
                    geom::angle_between(delta_start_m, delta_end_m)
                        * sign_num(geom::cross(delta_start_m, delta_end_m))
                        * distance_m
                        / length_m;

                center_m
                    + Rotation2d::from_radians(delta_angle_rad)
                        .rotate_vector(delta_start_m)
            }
        }
    }

    /// Distance from a point on the segment to the segment's end, measured
    /// along the segment.
    pub fn remaining_distance(&self, position_m: &Vector2<f64>) -> f64 {
        match &self.geometry {
            SegmentGeometry::Line { .. } => (self.end_m - position_m).norm(),
            SegmentGeometry::Arc {
                center_m,
                delta_start_m,
                delta_end_m,
            } => {
                let total_angle_rad =
                    geom::angle_between(delta_start_m, delta_end_m);

                if total_angle_rad < 1e-9 {
                    return 0.0;
                }

                let angle_rad = geom::angle_between(
                    delta_end_m,
                    &(position_m - center_m),
                );

                angle_rad / total_angle_rad * self.length_m()
            }
        }
    }

    /// Distance along the segment covered when the closest point to
    /// `position_m` has been reached.
    pub fn distance_travelled(&self, position_m: &Vector2<f64>) -> f64 {
        let closest = self.closest_point(position_m);

        self.length_m() - self.remaining_distance(&closest)
    }

    /// The planned speed at `distance_m` along the segment.
    ///
    /// Distances outside the profile are clamped to its ends.
    pub fn speed_by_distance(&self, distance_m: f64) -> f64 {
        let start_pos = self.speed_profile.start_pos();
        let end_pos = self.speed_profile.end_pos();

        let distance_m = if distance_m < start_pos || distance_m > end_pos {
            distance_m.max(start_pos).min(end_pos)
        }
        else {
            distance_m
        };

        let state = self.speed_profile.first_state_by_pos(distance_m);

        if state.is_valid() {
            state.vel
        }
        else {
            error!(
                "Speed profile has no state at distance {}, commanding zero",
                distance_m
            );
            0.0
        }
    }

    /// The planned speed at the point of the segment closest to
    /// `position_m`.
    pub fn speed_by_closest_point(&self, position_m: &Vector2<f64>) -> f64 {
        self.speed_by_distance(self.distance_travelled(position_m))
    }

    /// The end state of the speed profile, used to seed the next segment's
    /// profile.
    pub fn end_state(&self) -> MotionState {
        self.speed_profile.end_state()
    }

    fn create_speed_profile(
        &mut self,
        start_state: &MotionState,
        end_speed_ms: f64,
        max_accel_mss: f64,
    ) {
        let constraints = MotionProfileConstraints {
            max_abs_vel: self.max_speed_ms,
            max_abs_acc: max_accel_mss,
        };
        let goal = MotionProfileGoal::new(
            self.length_m(),
            end_speed_ms,
            crate::motion::CompletionBehavior::Overshoot,
            MotionProfileGoal::DEFAULT_POS_TOLERANCE,
            MotionProfileGoal::DEFAULT_VEL_TOLERANCE,
        );

        self.speed_profile = generate_profile(&constraints, &goal, start_state);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use util::maths::epsilon_equals;

    fn rest() -> MotionState {
        MotionState::new(0.0, 0.0, 0.0, 0.0)
    }

    fn line() -> PathSegment {
        PathSegment::new_line(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            1.0,
            &rest(),
            0.0,
            1.0,
        )
    }

    /// Quarter circle of radius 1 from (1, 0) anticlockwise to (0, 1).
    fn quarter_arc() -> PathSegment {
        PathSegment::new_arc(
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(0.0, 0.0),
            1.0,
            &rest(),
            0.0,
            1.0,
        )
    }

    #[test]
    fn test_line_geometry() {
        let line = line();

        assert!(epsilon_equals(line.length_m(), 2.0, 1e-9));

        // Closest point projects and clamps
        let closest = line.closest_point(&Vector2::new(1.0, 0.5));
        assert!(epsilon_equals(closest[0], 1.0, 1e-9));
        assert!(epsilon_equals(closest[1], 0.0, 1e-9));

        let clamped = line.closest_point(&Vector2::new(-1.0, 1.0));
        assert!(epsilon_equals(clamped[0], 0.0, 1e-9));

        // Remaining distance from the middle
        assert!(epsilon_equals(
            line.remaining_distance(&Vector2::new(0.5, 0.0)),
            1.5,
            1e-9
        ));

        let midpoint = line.point_by_distance(1.0);
        assert!(epsilon_equals(midpoint[0], 1.0, 1e-9));
    }

    #[test]
    fn test_arc_geometry() {
        let arc = quarter_arc();

        assert!(epsilon_equals(arc.length_m(), FRAC_PI_2, 1e-9));

        // Halfway along the arc is 45 degrees around
        let halfway = arc.point_by_distance(FRAC_PI_2 / 2.0);
        assert!(epsilon_equals(halfway[0], 0.5f64.sqrt(), 1e-9));
        assert!(epsilon_equals(halfway[1], 0.5f64.sqrt(), 1e-9));

        // A point outside the sweep projects onto the nearer endpoint
        let closest = arc.closest_point(&Vector2::new(2.0, -1.0));
        assert!(epsilon_equals(closest[0], 1.0, 1e-9));
        assert!(epsilon_equals(closest[1], 0.0, 1e-9));

        // A point within the sweep projects radially onto the arc
        let closest = arc.closest_point(&Vector2::new(2.0, 2.0));
        assert!(epsilon_equals(closest[0], 0.5f64.sqrt(), 1e-9));
        assert!(epsilon_equals(closest[1], 0.5f64.sqrt(), 1e-9));

        // Remaining distance at the start is the whole arc
        assert!(epsilon_equals(
            arc.remaining_distance(&Vector2::new(1.0, 0.0)),
            FRAC_PI_2,
            1e-9
        ));
    }

    #[test]
    fn test_clockwise_arc() {
        // Quarter circle from (0, 1) clockwise to (1, 0)
        let arc = PathSegment::new_arc(
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 0.0),
            1.0,
            &rest(),
            0.0,
            1.0,
        );

        let halfway = arc.point_by_distance(FRAC_PI_2 / 2.0);
        assert!(epsilon_equals(halfway[0], 0.5f64.sqrt(), 1e-9));
        assert!(epsilon_equals(halfway[1], 0.5f64.sqrt(), 1e-9));
    }

    #[test]
    fn test_speed_profile() {
        let line = line();

        // Accelerate at 1 up to the speed limit of 1, hold, stop by the end
        assert!(epsilon_equals(line.speed_by_distance(0.125), 0.5, 1e-6));
        assert!(epsilon_equals(line.speed_by_distance(1.0), 1.0, 1e-6));
        assert!(epsilon_equals(line.speed_by_distance(2.0), 0.0, 1e-2));

        // Out of range distances clamp to the profile ends
        assert!(epsilon_equals(line.speed_by_distance(5.0), 0.0, 1e-2));
        assert!(epsilon_equals(line.speed_by_distance(-1.0), 0.0, 1e-6));

        // Speed at the closest point to an off-path position
        assert!(epsilon_equals(
            line.speed_by_closest_point(&Vector2::new(1.0, 0.3)),
            1.0,
            1e-6
        ));
    }

    #[test]
    fn test_lookahead_extrapolation() {
        let mut line = line();

        // Clamped by default
        let end = line.point_by_distance(3.0);
        assert!(epsilon_equals(end[0], 2.0, 1e-9));

        // Extrapolates past the end when enabled
        line.set_extrapolate_lookahead(true);
        let beyond = line.point_by_distance(3.0);
        assert!(epsilon_equals(beyond[0], 3.0, 1e-9));
    }
}
