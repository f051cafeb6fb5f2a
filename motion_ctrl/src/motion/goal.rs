//! Motion profile goals and constraints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use serde::{Deserialize, Serialize};

// Internal imports
use super::MotionState;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the profile generator may sacrifice when a goal cannot be met
/// exactly, for example when the motion is already too fast to stop at the
/// goal position within the acceleration limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionBehavior {
    /// Reach the goal position at no more than the goal velocity, passing it
    /// and coming back if necessary. Only valid for goals with a velocity
    /// tolerance covering a full stop.
    Overshoot,

    /// Exceed the acceleration constraint to hit the goal position at the
    /// goal velocity exactly.
    ViolateMaxAccel,

    /// Reach the goal position exactly, arriving faster than the goal
    /// velocity if needed.
    ViolateMaxAbsVel,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The target of a motion profile: a position to reach at no more than a
/// given speed, with tolerances defining "close enough".
///
/// Equality is exact (bitwise on the floats), which is what the setpoint
/// generator's caching relies on: any change of goal forces a regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionProfileGoal {
    pos: f64,
    max_abs_vel: f64,
    completion_behavior: CompletionBehavior,
    pos_tolerance: f64,
    vel_tolerance: f64,
}

/// Symmetric velocity and acceleration limits for profile generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionProfileConstraints {
    pub max_abs_vel: f64,
    pub max_abs_acc: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionProfileGoal {
    pub const DEFAULT_POS_TOLERANCE: f64 = 1e-3;
    pub const DEFAULT_VEL_TOLERANCE: f64 = 1e-2;

    /// Build a goal, normalising the completion behavior.
    ///
    /// `Overshoot` only makes sense if the goal velocity is an effective
    /// stop, since overshooting means passing the goal and coming back
    /// through it. If the goal velocity exceeds the velocity tolerance the
    /// behavior is silently demoted to `ViolateMaxAccel`.
    pub fn new(
        pos: f64,
        max_abs_vel: f64,
        completion_behavior: CompletionBehavior,
        pos_tolerance: f64,
        vel_tolerance: f64,
    ) -> Self {
        let completion_behavior = if completion_behavior
            == CompletionBehavior::Overshoot
            && max_abs_vel > vel_tolerance
        {
            CompletionBehavior::ViolateMaxAccel
        }
        else {
            completion_behavior
        };

        Self {
            pos,
            max_abs_vel,
            completion_behavior,
            pos_tolerance,
            vel_tolerance,
        }
    }

    /// Build a goal to stop at `pos`, with default tolerances.
    pub fn from_pos(pos: f64) -> Self {
        Self::new(
            pos,
            0.0,
            CompletionBehavior::Overshoot,
            Self::DEFAULT_POS_TOLERANCE,
            Self::DEFAULT_VEL_TOLERANCE,
        )
    }

    pub fn pos(&self) -> f64 {
        self.pos
    }

    pub fn max_abs_vel(&self) -> f64 {
        self.max_abs_vel
    }

    pub fn completion_behavior(&self) -> CompletionBehavior {
        self.completion_behavior
    }

    pub fn pos_tolerance(&self) -> f64 {
        self.pos_tolerance
    }

    pub fn vel_tolerance(&self) -> f64 {
        self.vel_tolerance
    }

    /// The goal mirrored about the origin.
    pub fn flipped(&self) -> Self {
        Self {
            pos: -self.pos,
            ..*self
        }
    }

    /// True if `pos` is within the position tolerance of the goal.
    pub fn at_goal_pos(&self, pos: f64) -> bool {
        (pos - self.pos).abs() < self.pos_tolerance
    }

    /// True if a state meets this goal: at the goal position, and either
    /// within the velocity bound (plus tolerance) or allowed to be faster by
    /// `ViolateMaxAbsVel`.
    pub fn at_goal_state(&self, state: &MotionState) -> bool {
        self.at_goal_pos(state.pos)
            && (state.vel.abs() < self.max_abs_vel + self.vel_tolerance
                || self.completion_behavior
                    == CompletionBehavior::ViolateMaxAbsVel)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
