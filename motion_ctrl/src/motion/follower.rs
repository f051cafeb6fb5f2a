//! PID + feedforward follower for motion profiles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;
use serde::{Deserialize, Serialize};

// Internal imports
use super::{
    CompletionBehavior, MotionProfileConstraints, MotionProfileGoal,
    MotionState, Setpoint, SetpointGenerator,
};
use util::maths::sign_num;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains for the profile follower.
///
/// `k_p`, `k_i` and `k_v` act on position/velocity error, `k_ffv` and
/// `k_ffa` are feedforward on the setpoint velocity and acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileFollowerGains {
    pub k_p: f64,
    pub k_i: f64,
    pub k_v: f64,
    pub k_ffv: f64,
    pub k_ffa: f64,
}

/// Follows a motion profile by combining feedforward on the profile
/// setpoint with PID feedback on the measured state.
///
/// Each tick the follower asks its [`SetpointGenerator`] for the state the
/// motion should be in now and produces an output command:
///
/// `out = kP*posErr + kV*velErr + kFFV*setpointVel + kFFA*setpointAcc`
///
/// plus an integral term on position error. The integral only accumulates
/// while the raw output is within the output limits; saturation resets it,
/// so windup cannot build up while the actuator is pinned.
#[derive(Debug, Clone)]
pub struct ProfileFollower {
    gains: ProfileFollowerGains,

    min_output: f64,
    max_output: f64,

    latest_actual_state: MotionState,
    initial_state: MotionState,
    latest_pos_error: f64,
    latest_vel_error: f64,
    total_error: f64,

    goal: Option<MotionProfileGoal>,
    constraints: Option<MotionProfileConstraints>,
    setpoint_generator: SetpointGenerator,
    latest_setpoint: Option<Setpoint>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileFollower {
    pub fn new(gains: ProfileFollowerGains) -> Self {
        Self {
            gains,
            min_output: f64::NEG_INFINITY,
            max_output: f64::INFINITY,
            latest_actual_state: MotionState::INVALID,
            initial_state: MotionState::INVALID,
            latest_pos_error: f64::NAN,
            latest_vel_error: f64::NAN,
            total_error: 0.0,
            goal: None,
            constraints: None,
            setpoint_generator: SetpointGenerator::new(),
            latest_setpoint: None,
        }
    }

    pub fn set_gains(&mut self, gains: ProfileFollowerGains) {
        self.gains = gains;
    }

    /// Clamp the output command into `[min_output, max_output]`.
    pub fn set_output_limits(&mut self, min_output: f64, max_output: f64) {
        self.min_output = min_output;
        self.max_output = max_output;
    }

    /// Set a new goal and constraints.
    ///
    /// Changing the goal while a previous one was already met un-finishes
    /// the follower so the next update pursues the new goal.
    pub fn set_goal_and_constraints(
        &mut self,
        goal: MotionProfileGoal,
        constraints: MotionProfileConstraints,
    ) {
        if let (Some(current), Some(setpoint)) =
            (&self.goal, self.latest_setpoint.as_mut())
        {
            if *current != goal {
                setpoint.final_setpoint = false;
            }
        }

        self.goal = Some(goal);
        self.constraints = Some(constraints);
    }

    pub fn goal(&self) -> Option<MotionProfileGoal> {
        self.goal
    }

    /// Compute the output command for this tick.
    ///
    /// `latest_state` is the measured state of the motion and `t` the time
    /// to sample the profile at.
    pub fn update(&mut self, latest_state: &MotionState, t: f64) -> f64 {
        let (goal, constraints) = match (self.goal, self.constraints) {
            (Some(g), Some(c)) => (g, c),
            _ => {
                warn!("Profile follower updated with no goal set");
                return 0.0;
            }
        };

        self.latest_actual_state = *latest_state;

        // The profile is anchored at the last commanded setpoint, or at the
        // measured state on the first tick after a goal is set
        let prev_state = match self.latest_setpoint {
            Some(sp) => sp.motion_state,
            None => {
                self.initial_state = *latest_state;
                *latest_state
            }
        };

        let dt = (t - prev_state.t).max(0.0);

        let setpoint = self.setpoint_generator.get_setpoint(
            &constraints,
            &goal,
            &prev_state,
            t,
        );
        self.latest_setpoint = Some(setpoint);

        self.latest_pos_error = setpoint.motion_state.pos - latest_state.pos;
        self.latest_vel_error = setpoint.motion_state.vel - latest_state.vel;

        let mut output = self.gains.k_p * self.latest_pos_error
            + self.gains.k_v * self.latest_vel_error
            + self.gains.k_ffv * setpoint.motion_state.vel;

        if !setpoint.motion_state.acc.is_nan() {
            output += self.gains.k_ffa * setpoint.motion_state.acc;
        }

        if output >= self.min_output && output <= self.max_output {
            self.total_error += self.latest_pos_error * dt;
            output += self.gains.k_i * self.total_error;
        }
        else {
            // Saturated: drop the integral entirely so it cannot wind up
            self.total_error = 0.0;
        }

        output.max(self.min_output).min(self.max_output)
    }

    /// True once the profile has been consumed and its last setpoint
    /// reached.
    pub fn is_finished(&self) -> bool {
        self.goal.is_some()
            && self
                .latest_setpoint
                .map_or(false, |sp| sp.final_setpoint)
    }

    /// True if the measured state meets the goal, or (for non-overshoot
    /// goals) has passed it.
    pub fn is_on_target(&self) -> bool {
        let goal = match self.goal {
            Some(g) => g,
            None => return false,
        };

        if self.latest_setpoint.is_none() {
            return false;
        }

        if goal.at_goal_state(&self.latest_actual_state) {
            return true;
        }

        // For goals that must not overshoot, crossing to the far side of the
        // goal also counts as arrival
        let goal_to_start = goal.pos() - self.initial_state.pos;
        let goal_to_actual = goal.pos() - self.latest_actual_state.pos;
        let passed_goal =
            sign_num(goal_to_start) * sign_num(goal_to_actual) < 0.0;

        goal.completion_behavior() != CompletionBehavior::Overshoot
            && passed_goal
    }

    pub fn setpoint(&self) -> MotionState {
        match self.latest_setpoint {
            Some(sp) => sp.motion_state,
            None => MotionState::INVALID,
        }
    }

    pub fn pos_error(&self) -> f64 {
        self.latest_pos_error
    }

    pub fn vel_error(&self) -> f64 {
        self.latest_vel_error
    }

    /// The accumulated integral of position error.
    pub fn integral_error(&self) -> f64 {
        self.total_error
    }

    pub fn reset_integral(&mut self) {
        self.total_error = 0.0;
    }

    /// Forget the cached setpoint and profile, keeping the goal. The next
    /// update restarts the profile from the measured state.
    pub fn reset_setpoint(&mut self) {
        self.latest_setpoint = None;
        self.setpoint_generator.reset();
    }

    /// Forget goal, state and accumulated error, keeping gains and output
    /// limits.
    pub fn clear(&mut self) {
        self.goal = None;
        self.constraints = None;
        self.total_error = 0.0;
        self.initial_state = MotionState::INVALID;
        self.latest_actual_state = MotionState::INVALID;
        self.latest_pos_error = f64::NAN;
        self.latest_vel_error = f64::NAN;
        self.latest_setpoint = None;
        self.setpoint_generator.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use util::maths::epsilon_equals;

    fn gains() -> ProfileFollowerGains {
        ProfileFollowerGains {
            k_p: 1.0,
            k_i: 0.5,
            k_v: 0.0,
            k_ffv: 1.0,
            k_ffa: 0.0,
        }
    }

    fn goal(pos: f64) -> MotionProfileGoal {
        MotionProfileGoal::from_pos(pos)
    }

    fn constraints() -> MotionProfileConstraints {
        MotionProfileConstraints {
            max_abs_vel: 1.0,
            max_abs_acc: 2.0,
        }
    }

    #[test]
    fn test_update_without_goal() {
        let mut follower = ProfileFollower::new(gains());

        assert_eq!(
            follower.update(&MotionState::new(0.0, 0.0, 0.0, 0.0), 0.0),
            0.0
        );
        assert!(!follower.is_finished());
    }

    #[test]
    fn test_follows_profile_with_perfect_plant() {
        // Pure velocity feedforward: with a perfect plant the output is
        // exactly the setpoint velocity
        let mut follower = ProfileFollower::new(ProfileFollowerGains {
            k_p: 0.0,
            k_i: 0.0,
            k_v: 0.0,
            k_ffv: 1.0,
            k_ffa: 0.0,
        });
        follower.set_goal_and_constraints(goal(2.0), constraints());

        // Plant that is always exactly at the previous setpoint
        let mut state = MotionState::new(0.0, 0.0, 0.0, 0.0);
        let dt = 0.01;
        let mut finished_at = None;

        for i in 1..=1000 {
            let t = i as f64 * dt;
            let output = follower.update(&state, t);

            state = follower.setpoint();
            assert!(epsilon_equals(output, state.vel, 1e-6));

            if follower.is_finished() {
                finished_at = Some(t);
                break;
            }
        }

        let finished_at = finished_at.expect("follower never finished");

        // 2 m at max vel 1 and acc 2 takes 2.5 s
        assert!(finished_at > 2.0 && finished_at < 3.5);
        assert!(follower.is_on_target());
        assert!(epsilon_equals(state.pos, 2.0, 1e-6));
    }

    #[test]
    fn test_integral_resets_while_saturated() {
        let mut follower = ProfileFollower::new(ProfileFollowerGains {
            k_p: 1.0,
            k_i: 0.5,
            k_v: 0.0,
            k_ffv: 0.0,
            k_ffa: 0.0,
        });
        follower.set_output_limits(-0.1, 0.1);
        follower.set_goal_and_constraints(goal(100.0), constraints());

        // Prime the follower so the profile is anchored at the origin
        follower.update(&MotionState::new(0.0, 0.0, 0.0, 0.0), 0.01);

        // A plant stuck far behind the setpoint saturates the raw output,
        // so the integral is dropped every tick
        let behind = MotionState::new(0.0, -10.0, 0.0, 0.0);
        let mut t = 0.01;

        for _ in 0..50 {
            t += 0.01;
            let output = follower.update(&behind, t);

            assert!(epsilon_equals(output, 0.1, 1e-9));
            assert_eq!(follower.integral_error(), 0.0);
        }

        // A plant close to the setpoint brings the output back in range
        // and the integral starts accumulating again
        let setpoint = follower.setpoint();
        let near = MotionState::new(
            setpoint.t,
            setpoint.pos - 0.05,
            setpoint.vel,
            0.0,
        );

        t += 0.01;
        follower.update(&near, t);
        assert!(follower.integral_error() > 0.0);
    }

    #[test]
    fn test_is_on_target_when_passed_goal() {
        let mut follower = ProfileFollower::new(gains());
        follower.set_goal_and_constraints(
            MotionProfileGoal::new(
                1.0,
                0.5,
                CompletionBehavior::ViolateMaxAccel,
                1e-3,
                1e-2,
            ),
            constraints(),
        );

        // First tick from the origin
        follower.update(&MotionState::new(0.0, 0.0, 0.0, 0.0), 0.01);
        assert!(!follower.is_on_target());

        // The plant blows past the goal: for a non-overshoot goal that
        // counts as on target
        follower.update(&MotionState::new(0.01, 1.5, 0.2, 0.0), 0.02);
        assert!(follower.is_on_target());
    }

    #[test]
    fn test_clear_keeps_gains_and_limits() {
        let mut follower = ProfileFollower::new(gains());
        follower.set_output_limits(-1.0, 1.0);
        follower.set_goal_and_constraints(goal(5.0), constraints());
        follower.update(&MotionState::new(0.0, 0.0, 0.0, 0.0), 0.01);

        follower.clear();

        assert!(follower.goal().is_none());
        assert!(follower.pos_error().is_nan());

        // Output limits survive: a fresh large goal still clamps to 1.0
        follower.set_goal_and_constraints(goal(100.0), constraints());
        let output = follower.update(&MotionState::new(0.0, 0.0, 0.0, 0.0), 1.0);
        assert!(output <= 1.0);
    }
}
