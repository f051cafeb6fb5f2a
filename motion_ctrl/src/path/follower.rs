//! Combined steering and speed control along a path

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use serde::{Deserialize, Serialize};

// Internal imports
use super::{
    AdaptivePurePursuitController, Lookahead, Path, REALLY_BIG_NUMBER,
};
use crate::geom::{RigidTransform2d, Twist2d};
use crate::motion::{
    CompletionBehavior, MotionProfileConstraints, MotionProfileGoal,
    MotionState, ProfileFollower, ProfileFollowerGains,
};
use log::debug;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tuning parameters for the path follower, typically loaded from a TOML
/// parameter file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathFollowerParams {
    /// Lookahead distance schedule for the steering controller.
    pub lookahead: Lookahead,

    /// Scales extra heading command proportional to speed, countering the
    /// rover's tendency to straighten the arc at speed. Zero disables it.
    pub inertia_gain: f64,

    /// Gains for the velocity profile follower.
    pub profile_gains: ProfileFollowerGains,

    /// Speed limit of the velocity profile.
    pub profile_max_abs_vel_ms: f64,

    /// Acceleration limit of the velocity profile.
    pub profile_max_abs_acc_mss: f64,

    pub goal_pos_tolerance_m: f64,

    pub goal_vel_tolerance_ms: f64,

    /// Once less than this much path remains the steering is frozen and
    /// only the velocity profile runs the stop.
    pub stop_steering_distance_m: f64,
}

/// Drives the rover along a path.
///
/// Couples an [`AdaptivePurePursuitController`], which decides the shape of
/// the arc to drive, with a [`ProfileFollower`], which decides how fast to
/// drive it. Each tick the steering arc becomes a displacement goal for the
/// velocity controller, and the velocity command is folded back into the
/// arc to produce the commanded twist.
#[derive(Debug, Clone)]
pub struct PathFollower {
    steering_controller: AdaptivePurePursuitController,
    velocity_controller: ProfileFollower,

    inertia_gain: f64,
    profile_max_abs_vel_ms: f64,
    profile_max_abs_acc_mss: f64,
    goal_pos_tolerance_m: f64,
    goal_vel_tolerance_ms: f64,
    stop_steering_distance_m: f64,

    last_steering_delta: Twist2d,
    cross_track_error_m: f64,
    along_track_error_m: f64,
    done_steering: bool,
    override_finished: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathFollower {
    pub fn new(path: Path, params: &PathFollowerParams) -> Self {
        Self {
            steering_controller: AdaptivePurePursuitController::new(
                path,
                params.lookahead,
            ),
            velocity_controller: ProfileFollower::new(params.profile_gains),
            inertia_gain: params.inertia_gain,
            profile_max_abs_vel_ms: params.profile_max_abs_vel_ms,
            profile_max_abs_acc_mss: params.profile_max_abs_acc_mss,
            goal_pos_tolerance_m: params.goal_pos_tolerance_m,
            goal_vel_tolerance_ms: params.goal_vel_tolerance_ms,
            stop_steering_distance_m: params.stop_steering_distance_m,
            last_steering_delta: Twist2d::identity(),
            cross_track_error_m: 0.0,
            along_track_error_m: 0.0,
            done_steering: false,
            override_finished: false,
        }
    }

    /// Compute the twist to command this tick.
    ///
    /// `t` is the current time, `pose` the rover's pose, `displacement_m`
    /// the distance driven so far and `velocity_ms` the measured speed.
    pub fn update(
        &mut self,
        t: f64,
        pose: &RigidTransform2d,
        displacement_m: f64,
        velocity_ms: f64,
    ) -> Twist2d {
        if !self.done_steering {
            let steering = self.steering_controller.update(pose);

            self.cross_track_error_m = steering.cross_track_error_m;
            self.last_steering_delta = steering.delta;

            // The steering arc becomes a displacement goal: drive this much
            // further, arriving at the lookahead point's planned speed
            self.velocity_controller.set_goal_and_constraints(
                MotionProfileGoal::new(
                    displacement_m + steering.delta.dx_m,
                    steering.end_speed_ms.abs(),
                    CompletionBehavior::ViolateMaxAccel,
                    self.goal_pos_tolerance_m,
                    self.goal_vel_tolerance_ms,
                ),
                MotionProfileConstraints {
                    max_abs_vel: self
                        .profile_max_abs_vel_ms
                        .min(steering.max_speed_ms),
                    max_abs_acc: self.profile_max_abs_acc_mss,
                },
            );

            if steering.remaining_path_length_m < self.stop_steering_distance_m
            {
                // Freeze the steering and let the profile run the stop out
                self.done_steering = true;

                debug!(
                    "Steering frozen with {:.3} m of path remaining",
                    steering.remaining_path_length_m
                );
            }
        }

        let velocity_command_ms = self.velocity_controller.update(
            &MotionState::new(t, displacement_m, velocity_ms, 0.0),
            t,
        );
        self.along_track_error_m = self.velocity_controller.pos_error();

        let mut dtheta_rad = self.last_steering_delta.dtheta_rad;
        let curvature = self.last_steering_delta.dtheta_rad
            / self.last_steering_delta.dx_m;

        if !curvature.is_nan() && curvature.abs() < REALLY_BIG_NUMBER {
            // Regenerate the heading command from the arc's curvature, with
            // an inertia term growing with the profile speed
            let abs_velocity_setpoint =
                self.velocity_controller.setpoint().vel.abs();

            dtheta_rad = self.last_steering_delta.dx_m
                * curvature
                * (1.0 + self.inertia_gain * abs_velocity_setpoint);
        }

        if self.last_steering_delta.dx_m.abs() < 1e-9 {
            // Degenerate arc, do not command the actuators this tick
            return Twist2d::identity();
        }

        let scale = velocity_command_ms / self.last_steering_delta.dx_m;

        Twist2d::new(
            self.last_steering_delta.dx_m * scale,
            0.0,
            dtheta_rad * scale,
        )
    }

    /// True once the path has been driven and the rover has stopped on the
    /// goal, or the follower has been forced finished.
    pub fn is_finished(&self) -> bool {
        (self.steering_controller.is_finished()
            && self.velocity_controller.is_finished()
            && self.velocity_controller.is_on_target())
            || self.override_finished
    }

    /// Force [`is_finished`](Self::is_finished) true, abandoning the path.
    pub fn force_finish(&mut self) {
        self.override_finished = true;
    }

    pub fn is_profile_finished(&self) -> bool {
        self.velocity_controller.is_finished()
    }

    pub fn is_profile_on_target(&self) -> bool {
        self.velocity_controller.is_on_target()
    }

    /// The velocity profile's current setpoint.
    pub fn profile_setpoint(&self) -> MotionState {
        self.velocity_controller.setpoint()
    }

    pub fn cross_track_error_m(&self) -> f64 {
        self.cross_track_error_m
    }

    pub fn along_track_error_m(&self) -> f64 {
        self.along_track_error_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
