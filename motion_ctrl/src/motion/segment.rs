//! Constant acceleration segment of a motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::error;
use serde::{Deserialize, Serialize};

// Internal imports
use super::MotionState;
use crate::EPSILON;
use util::maths::epsilon_equals;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A period of constant acceleration motion between two states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSegment {
    pub start: MotionState,
    pub end: MotionState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionSegment {
    pub fn new(start: MotionState, end: MotionState) -> Self {
        Self { start, end }
    }

    /// True if the segment is internally consistent: both endpoints share the
    /// same acceleration and the end state is the start state extrapolated to
    /// the end time.
    ///
    /// A zero-duration segment with infinite acceleration is also valid; the
    /// generator uses one to express an instantaneous velocity change when
    /// the goal allows acceleration violation.
    pub fn is_valid(&self) -> bool {
        if !epsilon_equals(self.start.acc, self.end.acc, EPSILON) {
            error!(
                "Segment acceleration not constant: start acc {}, end acc {}",
                self.start.acc, self.end.acc
            );
            return false;
        }

        if epsilon_equals(self.start.t, self.end.t, EPSILON)
            && self.start.acc.is_infinite()
        {
            // Instantaneous velocity change
            return true;
        }

        let extrapolated = self.start.extrapolate(self.end.t, self.start.acc);

        if !extrapolated.coincident(&self.end) {
            error!(
                "Segment end state inconsistent with start state: expected \
                 {:?}, got {:?}",
                extrapolated, self.end
            );
            return false;
        }

        true
    }

    /// True if `t` lies within the segment's time range (inclusive).
    pub fn contains_time(&self, t: f64) -> bool {
        t >= self.start.t && t <= self.end.t
    }

    /// True if `pos` lies within the segment's position range (inclusive),
    /// in either direction of travel.
    pub fn contains_pos(&self, pos: f64) -> bool {
        (pos >= self.start.pos && pos <= self.end.pos)
            || (pos <= self.start.pos && pos >= self.end.pos)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
