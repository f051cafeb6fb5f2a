//! Cached setpoint generation on top of the profile generator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::debug;
use serde::{Deserialize, Serialize};

// Internal imports
use super::{
    generate_profile, MotionProfile, MotionProfileConstraints,
    MotionProfileGoal, MotionState,
};
use util::maths::sign_num;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sample of a motion profile, flagged when it is the last one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    pub motion_state: MotionState,

    /// True once the profile is exhausted or the sampled state meets the
    /// goal. Final setpoints are snapped exactly onto the goal.
    pub final_setpoint: bool,
}

/// Samples motion profiles one state per tick, regenerating the underlying
/// profile only when something changed.
///
/// The profile is kept between ticks and trimmed as time advances, so
/// repeated calls with the same goal and constraints just walk along the
/// cached trajectory. A new goal, new constraints, or an actual state that
/// has diverged from the cached trajectory forces a regeneration from the
/// previous state.
#[derive(Debug, Clone, Default)]
pub struct SetpointGenerator {
    profile: Option<MotionProfile>,
    goal: Option<MotionProfileGoal>,
    constraints: Option<MotionProfileConstraints>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SetpointGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any cached profile, forcing regeneration on the next call.
    pub fn reset(&mut self) {
        self.profile = None;
        self.goal = None;
        self.constraints = None;
    }

    /// The cached profile, if any.
    pub fn profile(&self) -> Option<&MotionProfile> {
        self.profile.as_ref()
    }

    /// Sample the profile for `goal` under `constraints` at time `t`.
    ///
    /// `prev_state` is the state the caller last commanded (or the measured
    /// state on the first call); it anchors regeneration when the cache is
    /// stale.
    pub fn get_setpoint(
        &mut self,
        constraints: &MotionProfileConstraints,
        goal: &MotionProfileGoal,
        prev_state: &MotionState,
        t: f64,
    ) -> Setpoint {
        let mut regenerate = self.profile.is_none()
            || self.goal.map_or(true, |g| g != *goal)
            || self.constraints.map_or(true, |c| c != *constraints);

        if !regenerate {
            // Same goal and constraints: check that the cached trajectory
            // still agrees with where the caller actually is
            if let Some(profile) = &self.profile {
                if !profile.is_empty() {
                    let expected = profile.state_by_time(prev_state.t);

                    regenerate =
                        !expected.is_valid() || !expected.approx_equal(prev_state);
                }
            }
        }

        if regenerate {
            debug!(
                "Regenerating profile: goal pos {}, prev state pos {}",
                goal.pos(),
                prev_state.pos
            );

            self.goal = Some(*goal);
            self.constraints = Some(*constraints);
            self.profile = Some(generate_profile(constraints, goal, prev_state));
        }

        let mut setpoint = None;

        if let Some(profile) = self.profile.as_mut() {
            if profile.is_valid() && !profile.is_empty() {
                // Clamp the sample time into the profile
                let state = if t > profile.end_time() {
                    profile.end_state()
                }
                else if t < profile.start_time() {
                    profile.start_state()
                }
                else {
                    profile.state_by_time(t)
                };

                // The profile is consumed as time advances
                profile.trim_before_time(t);

                setpoint = Some(Setpoint {
                    motion_state: state,
                    final_setpoint: profile.is_empty()
                        || goal.at_goal_state(&state),
                });
            }
        }

        // An invalid or empty profile answers with the previous state
        let mut setpoint = setpoint.unwrap_or(Setpoint {
            motion_state: *prev_state,
            final_setpoint: true,
        });

        if setpoint.final_setpoint {
            // Snap onto the goal so callers see it met exactly
            setpoint.motion_state.pos = goal.pos();
            setpoint.motion_state.vel = sign_num(setpoint.motion_state.vel)
                * goal.max_abs_vel().max(setpoint.motion_state.vel.abs());
            setpoint.motion_state.acc = 0.0;
        }

        setpoint
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
