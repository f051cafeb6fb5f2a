//! Adaptive pure pursuit steering

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal imports
use super::{Lookahead, Path, REALLY_BIG_NUMBER};
use crate::geom::{self, RigidTransform2d, Rotation2d, Twist2d};
use util::maths::sign_num;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One tick of steering advice from the pure pursuit controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SteeringCommand {
    /// The arc to drive: forward distance and heading change taking the
    /// rover to the lookahead point.
    pub delta: Twist2d,

    /// Distance from the rover to the path.
    pub cross_track_error_m: f64,

    /// Speed limit of the segment being pursued.
    pub max_speed_ms: f64,

    /// Planned speed at the lookahead point.
    pub end_speed_ms: f64,

    pub lookahead_point_m: Vector2<f64>,

    pub remaining_path_length_m: f64,
}

/// Steers the rover along a [`Path`] by always aiming at a point a little
/// way ahead on it.
///
/// Each tick the controller finds the lookahead point (further away the
/// faster the rover is planned to be going), constructs the circular arc
/// from the rover's pose to it, and returns that arc as a twist. Near the
/// end of the path the twist is scaled down by the remaining distance and
/// the controller latches finished.
#[derive(Debug, Clone)]
pub struct AdaptivePurePursuitController {
    path: Path,
    lookahead: Lookahead,
    at_end_of_path: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AdaptivePurePursuitController {
    pub fn new(path: Path, lookahead: Lookahead) -> Self {
        Self {
            path,
            lookahead,
            at_end_of_path: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the end of the path has been reached.
    pub fn is_finished(&self) -> bool {
        self.at_end_of_path
    }

    /// Compute the steering command for the rover at `pose`.
    pub fn update(&mut self, pose: &RigidTransform2d) -> SteeringCommand {
        let target = match self
            .path
            .target_point(&pose.translation_m, &self.lookahead)
        {
            Some(t) => t,
            None => {
                // Empty path, nothing to pursue
                self.at_end_of_path = true;

                return SteeringCommand {
                    delta: Twist2d::identity(),
                    cross_track_error_m: 0.0,
                    max_speed_ms: 0.0,
                    end_speed_ms: 0.0,
                    lookahead_point_m: pose.translation_m,
                    remaining_path_length_m: 0.0,
                };
            }
        };

        if self.at_end_of_path {
            // Hold position, the velocity controller finishes the stop
            return SteeringCommand {
                delta: Twist2d::identity(),
                cross_track_error_m: target.closest_point_distance_m,
                max_speed_ms: target.max_speed_ms,
                end_speed_ms: 0.0,
                lookahead_point_m: target.lookahead_point_m,
                remaining_path_length_m: target.remaining_path_distance_m,
            };
        }

        let center =
            Self::center(pose, &target.lookahead_point_m);
        let radius_m = (target.lookahead_point_m - center).norm();
        let arc_length_m = Self::arc_length(
            pose,
            &target.lookahead_point_m,
            &center,
            radius_m,
        );

        // At the end of the path the remaining distance caps the commanded
        // arc so the rover stops on the endpoint rather than the lookahead
        let mut scale = 1.0;

        if target.lookahead_point_speed_ms < 1e-6
            && target.remaining_path_distance_m < arc_length_m
        {
            scale =
                (target.remaining_path_distance_m / arc_length_m).max(0.0);
            self.at_end_of_path = true;

            debug!(
                "End of path: scaling steering arc by {:.4} over the final \
                 {:.3} m",
                scale, target.remaining_path_distance_m
            );
        }

        let direction = Self::direction(pose, &target.lookahead_point_m);

        SteeringCommand {
            delta: Twist2d::new(
                scale * arc_length_m,
                0.0,
                arc_length_m * direction * scale.abs() / radius_m,
            ),
            cross_track_error_m: target.closest_point_distance_m,
            max_speed_ms: target.max_speed_ms,
            end_speed_ms: target.lookahead_point_speed_ms * sign_num(scale),
            lookahead_point_m: target.lookahead_point_m,
            remaining_path_length_m: target.remaining_path_distance_m,
        }
    }

    /// Center of the circle through the rover's position (tangent to its
    /// heading) and the lookahead point.
    fn center(
        pose: &RigidTransform2d,
        point_m: &Vector2<f64>,
    ) -> Vector2<f64> {
        let pose_to_point_halfway =
            geom::interpolate(&pose.translation_m, point_m, 0.5);
        let normal = Rotation2d::from_direction(
            pose_to_point_halfway - pose.translation_m,
        )
        .normal();

        let perpendicular_bisector =
            RigidTransform2d::new(pose_to_point_halfway, normal);
        let normal_from_pose =
            RigidTransform2d::new(pose.translation_m, pose.rotation.normal());

        if normal_from_pose.is_colinear(&perpendicular_bisector.normal()) {
            // Special case: the point is dead ahead at twice the half
            // distance, the center degenerates onto the bisector
            pose_to_point_halfway
        }
        else {
            normal_from_pose.intersection(&perpendicular_bisector)
        }
    }

    /// Which way around the circle: positive for anticlockwise.
    fn direction(pose: &RigidTransform2d, point_m: &Vector2<f64>) -> f64 {
        let pose_to_point = point_m - pose.translation_m;

        sign_num(geom::cross(&pose.rotation.to_vector(), &pose_to_point))
    }

    /// Length of the arc from the pose to the point around the circle at
    /// `center_m`. Huge radii are treated as straight lines.
    fn arc_length(
        pose: &RigidTransform2d,
        point_m: &Vector2<f64>,
        center_m: &Vector2<f64>,
        radius_m: f64,
    ) -> f64 {
        if radius_m >= REALLY_BIG_NUMBER {
            return (point_m - pose.translation_m).norm();
        }

        let center_to_point = point_m - center_m;
        let center_to_pose = pose.translation_m - center_m;
        let angle_rad = geom::angle_between(&center_to_pose, &center_to_point);

        // A point behind the rover means going the long way around the
        // circle; which side it is on comes from the heading normal
        let pose_to_point = point_m - pose.translation_m;
        let behind = sign_num(geom::cross(
            &pose.rotation.normal().to_vector(),
            &pose_to_point,
        )) > 0.0;

        if behind {
            radius_m * (2.0 * std::f64::consts::PI - angle_rad.abs())
        }
        else {
            radius_m * angle_rad.abs()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
