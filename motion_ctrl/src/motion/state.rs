//! Instantaneous 1-D motion state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use serde::{Deserialize, Serialize};

// Internal imports
use crate::EPSILON;
use util::maths::{epsilon_equals, sign_num};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of a 1-D motion at an instant: time, position, velocity and
/// acceleration.
///
/// States are unit-agnostic; the same type serves wheel displacement in
/// metres or any other scalar axis, as long as the units are consistent
/// within one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub t: f64,
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionState {
    /// The invalid state, with all components NaN.
    ///
    /// Used as the error value for queries which have no answer, for example
    /// sampling a profile outside its time range.
    pub const INVALID: MotionState = MotionState {
        t: f64::NAN,
        pos: f64::NAN,
        vel: f64::NAN,
        acc: f64::NAN,
    };

    pub fn new(t: f64, pos: f64, vel: f64, acc: f64) -> Self {
        Self { t, pos, vel, acc }
    }

    /// True if no component is NaN.
    pub fn is_valid(&self) -> bool {
        !self.t.is_nan()
            && !self.pos.is_nan()
            && !self.vel.is_nan()
            && !self.acc.is_nan()
    }

    /// The state at time `t` assuming constant acceleration `acc` from this
    /// state.
    ///
    /// Extrapolation works backwards in time as well as forwards.
    pub fn extrapolate(&self, t: f64, acc: f64) -> MotionState {
        let dt = t - self.t;

        MotionState {
            t,
            pos: self.pos + self.vel * dt + 0.5 * acc * dt * dt,
            vel: self.vel + acc * dt,
            acc,
        }
    }

    /// The next time at or after this state's time at which the extrapolated
    /// motion passes through `pos`, or NaN if it never does.
    pub fn next_time_at_pos(&self, pos: f64) -> f64 {
        if epsilon_equals(self.pos, pos, EPSILON) {
            // Already at pos
            return self.t;
        }

        if epsilon_equals(self.acc, 0.0, EPSILON) {
            // Zero acceleration, pos is only reachable if the velocity points
            // towards it
            let delta_pos = pos - self.pos;

            if !epsilon_equals(self.vel, 0.0, EPSILON)
                && sign_num(delta_pos) == sign_num(self.vel)
            {
                return self.t + delta_pos / self.vel;
            }

            return f64::NAN;
        }

        // Solve 0.5*acc*dt^2 + vel*dt + (self.pos - pos) == 0 for the
        // smallest non-negative dt
        let disc = self.vel * self.vel - 2.0 * self.acc * (self.pos - pos);

        if disc < 0.0 {
            // Extrapolated motion never reaches pos
            return f64::NAN;
        }

        let sqrt_disc = disc.sqrt();
        let root_1 = (-self.vel + sqrt_disc) / self.acc;
        let root_2 = (-self.vel - sqrt_disc) / self.acc;

        if root_1 >= 0.0 && (root_2 < 0.0 || root_1 < root_2) {
            self.t + root_1
        }
        else if root_2 >= 0.0 {
            self.t + root_2
        }
        else {
            f64::NAN
        }
    }

    /// The state with position, velocity and acceleration negated.
    pub fn flipped(&self) -> MotionState {
        MotionState {
            t: self.t,
            pos: -self.pos,
            vel: -self.vel,
            acc: -self.acc,
        }
    }

    /// True if the two states have equal time, position and velocity within
    /// the nominal tolerance. Acceleration is ignored, so a cruise end and a
    /// deceleration start coincide.
    pub fn coincident(&self, other: &MotionState) -> bool {
        epsilon_equals(self.t, other.t, EPSILON)
            && epsilon_equals(self.pos, other.pos, EPSILON)
            && epsilon_equals(self.vel, other.vel, EPSILON)
    }

    /// True if all four components are equal within the nominal tolerance.
    pub fn approx_equal(&self, other: &MotionState) -> bool {
        self.coincident(other) && epsilon_equals(self.acc, other.acc, EPSILON)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
