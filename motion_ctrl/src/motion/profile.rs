//! Piecewise constant acceleration motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{error, warn};
use serde::{Deserialize, Serialize};

// Internal imports
use super::{MotionSegment, MotionState};
use crate::EPSILON;
use util::maths::epsilon_equals;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 1-D trajectory built from contiguous constant acceleration segments.
///
/// Segments are stored in time order and each segment's start state
/// coincides with the previous segment's end state. Queries outside the
/// profile's time or position range answer with [`MotionState::INVALID`]
/// rather than an error, so per-tick callers can treat the result uniformly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionProfile {
    segments: Vec<MotionSegment>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionProfile {
    /// An empty profile.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// A profile holding just the given state, as a single zero-duration
    /// segment. This is the seed the generator extends with controls.
    pub fn from_state(state: MotionState) -> Self {
        Self {
            segments: vec![MotionSegment::new(state, state)],
        }
    }

    /// Discard all segments and restart the profile from the given state.
    pub fn reset(&mut self, initial_state: MotionState) {
        self.segments.clear();
        self.segments
            .push(MotionSegment::new(initial_state, initial_state));
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[MotionSegment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [MotionSegment] {
        &mut self.segments
    }

    /// The first state of the profile, or `INVALID` if empty.
    pub fn start_state(&self) -> MotionState {
        match self.segments.first() {
            Some(s) => s.start,
            None => MotionState::INVALID,
        }
    }

    /// The last state of the profile, or `INVALID` if empty.
    pub fn end_state(&self) -> MotionState {
        match self.segments.last() {
            Some(s) => s.end,
            None => MotionState::INVALID,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start_state().t
    }

    pub fn end_time(&self) -> f64 {
        self.end_state().t
    }

    pub fn start_pos(&self) -> f64 {
        self.start_state().pos
    }

    pub fn end_pos(&self) -> f64 {
        self.end_state().pos
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Total distance travelled, counting direction reversals as positive
    /// distance.
    pub fn length(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| (s.end.pos - s.start.pos).abs())
            .sum()
    }

    /// True if every segment is internally consistent and each segment's
    /// start coincides with the previous segment's end.
    pub fn is_valid(&self) -> bool {
        let mut prev: Option<&MotionSegment> = None;

        for segment in &self.segments {
            if !segment.is_valid() {
                return false;
            }

            if let Some(prev) = prev {
                if !segment.start.coincident(&prev.end) {
                    error!(
                        "Profile has a discontinuity: segment ends at {:?} \
                         but next begins at {:?}",
                        prev.end, segment.start
                    );
                    return false;
                }
            }

            prev = Some(segment);
        }

        true
    }

    /// The state at time `t`, or `INVALID` if `t` is outside the profile.
    ///
    /// Times within the nominal tolerance of either end are snapped to that
    /// end state, so callers sampling exactly at a boundary are not tripped
    /// up by floating point noise.
    pub fn state_by_time(&self, t: f64) -> MotionState {
        if self.is_empty() {
            return MotionState::INVALID;
        }

        if t < self.start_time() {
            return if t + EPSILON >= self.start_time() {
                self.start_state()
            }
            else {
                MotionState::INVALID
            };
        }

        if t > self.end_time() {
            return if t - EPSILON <= self.end_time() {
                self.end_state()
            }
            else {
                MotionState::INVALID
            };
        }

        for segment in &self.segments {
            if segment.contains_time(t) {
                return segment.start.extrapolate(t, segment.start.acc);
            }
        }

        MotionState::INVALID
    }

    /// The state at time `t`, clamped to the profile's first or last state
    /// when `t` falls outside its range. `INVALID` only if the profile is
    /// empty.
    pub fn state_by_time_clamped(&self, t: f64) -> MotionState {
        if self.is_empty() {
            return MotionState::INVALID;
        }

        if t < self.start_time() {
            return self.start_state();
        }

        if t > self.end_time() {
            return self.end_state();
        }

        for segment in &self.segments {
            if segment.contains_time(t) {
                return segment.start.extrapolate(t, segment.start.acc);
            }
        }

        MotionState::INVALID
    }

    /// The first (earliest) state at which the profile passes through `pos`,
    /// or `INVALID` if it never does.
    pub fn first_state_by_pos(&self, pos: f64) -> MotionState {
        for segment in &self.segments {
            if !segment.contains_pos(pos) {
                continue;
            }

            if epsilon_equals(segment.end.pos, pos, EPSILON) {
                return segment.end;
            }

            let t = segment.start.next_time_at_pos(pos);

            if t.is_nan() {
                warn!(
                    "Segment containing pos {} has no crossing time, \
                     profile may be inconsistent",
                    pos
                );
                return MotionState::INVALID;
            }

            return segment
                .start
                .extrapolate(t.min(segment.end.t), segment.start.acc);
        }

        // The profile never reaches pos
        MotionState::INVALID
    }

    /// Remove all history before time `t`.
    ///
    /// Segments entirely before `t` are dropped, and a segment straddling
    /// `t` has its start advanced to `t`.
    pub fn trim_before_time(&mut self, t: f64) {
        let fully_past = self
            .segments
            .iter()
            .take_while(|s| s.end.t <= t)
            .count();
        self.segments.drain(..fully_past);

        if let Some(first) = self.segments.first_mut() {
            if first.start.t <= t {
                first.start = first.start.extrapolate(t, first.start.acc);
            }
        }
    }

    /// Append a segment to the profile.
    ///
    /// The caller is responsible for continuity with the current end state.
    pub fn append_segment(&mut self, segment: MotionSegment) {
        self.segments.push(segment);
    }

    /// Extend the profile by applying a constant acceleration for a
    /// duration.
    pub fn append_control(&mut self, acc: f64, dt: f64) {
        if self.is_empty() {
            error!("Cannot append a control to an empty profile");
            return;
        }

        let last_end = self.end_state();
        let start = MotionState::new(last_end.t, last_end.pos, last_end.vel, acc);

        self.segments
            .push(MotionSegment::new(start, start.extrapolate(start.t + dt, acc)));
    }

    /// Append all segments of another profile.
    pub fn append_profile(&mut self, other: &MotionProfile) {
        self.segments.extend_from_slice(other.segments());
    }

    /// Remove zero-duration segments, except that a profile never shrinks
    /// below one segment.
    pub fn consolidate(&mut self) {
        let mut i = 0;

        while i < self.segments.len() && self.segments.len() > 1 {
            if self.segments[i].start.coincident(&self.segments[i].end) {
                self.segments.remove(i);
            }
            else {
                i += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use util::maths::epsilon_equals;

    /// Accelerate from rest at 2 for 1 s, cruise 1 s, decelerate 1 s.
    fn trapezoid() -> MotionProfile {
        let mut profile =
            MotionProfile::from_state(MotionState::new(0.0, 0.0, 0.0, 0.0));
        profile.append_control(2.0, 1.0);
        profile.append_control(0.0, 1.0);
        profile.append_control(-2.0, 1.0);
        profile.consolidate();
        profile
    }

    #[test]
    fn test_append_control() {
        let mut profile = MotionProfile::from_state(MotionState::new(
            0.5, 2.5, 5.0, 5.0,
        ));
        profile.append_control(2.5, 1.5);

        let end = profile.end_state();
        assert!(epsilon_equals(end.t, 2.0, 1e-9));
        assert!(epsilon_equals(end.pos, 12.8125, 1e-9));
        assert!(epsilon_equals(end.vel, 8.75, 1e-9));
        assert!(epsilon_equals(end.acc, 2.5, 1e-9));
        assert!(profile.is_valid());
    }

    #[test]
    fn test_consolidate() {
        let mut profile =
            MotionProfile::from_state(MotionState::new(0.0, 0.0, 0.0, 0.0));
        profile.append_control(2.0, 1.0);

        // The zero-duration seed segment is removed, the real one kept
        profile.consolidate();
        assert_eq!(profile.num_segments(), 1);

        // A lone degenerate segment survives consolidation
        let mut seed =
            MotionProfile::from_state(MotionState::new(0.0, 1.0, 0.0, 0.0));
        seed.consolidate();
        assert_eq!(seed.num_segments(), 1);
    }

    #[test]
    fn test_state_by_time() {
        let profile = trapezoid();

        // Mid-acceleration
        let state = profile.state_by_time(0.5);
        assert!(epsilon_equals(state.pos, 0.25, 1e-9));
        assert!(epsilon_equals(state.vel, 1.0, 1e-9));

        // Mid-cruise
        let state = profile.state_by_time(1.5);
        assert!(epsilon_equals(state.pos, 2.0, 1e-9));
        assert!(epsilon_equals(state.vel, 2.0, 1e-9));

        // Within tolerance of the boundary snaps to the end state
        let state = profile.state_by_time(3.0 + 1e-7);
        assert!(epsilon_equals(state.vel, 0.0, 1e-9));

        // Outside the range gives INVALID
        assert!(!profile.state_by_time(3.1).is_valid());
        assert!(!profile.state_by_time(-0.1).is_valid());
    }

    #[test]
    fn test_state_by_time_clamped() {
        let profile = trapezoid();

        let before = profile.state_by_time_clamped(-1.0);
        assert!(epsilon_equals(before.pos, 0.0, 1e-9));

        let after = profile.state_by_time_clamped(10.0);
        assert!(epsilon_equals(after.pos, 4.0, 1e-9));
        assert!(epsilon_equals(after.vel, 0.0, 1e-9));

        assert!(!MotionProfile::new().state_by_time_clamped(0.0).is_valid());
    }

    #[test]
    fn test_first_state_by_pos() {
        let profile = trapezoid();

        // Position reached during cruise
        let state = profile.first_state_by_pos(2.0);
        assert!(epsilon_equals(state.t, 1.5, 1e-9));
        assert!(epsilon_equals(state.vel, 2.0, 1e-9));

        // Position beyond the profile
        assert!(!profile.first_state_by_pos(10.0).is_valid());
    }

    #[test]
    fn test_trim_before_time() {
        let mut profile = trapezoid();

        profile.trim_before_time(1.5);
        assert_eq!(profile.num_segments(), 2);
        assert!(epsilon_equals(profile.start_time(), 1.5, 1e-9));
        assert!(epsilon_equals(profile.start_pos(), 2.0, 1e-9));
        assert!(profile.is_valid());

        // Trimming is idempotent
        let before = profile.clone();
        profile.trim_before_time(1.5);
        assert_eq!(profile, before);

        // Trimming past the end empties the profile
        profile.trim_before_time(10.0);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_length_and_duration() {
        let profile = trapezoid();

        assert!(epsilon_equals(profile.duration(), 3.0, 1e-9));
        assert!(epsilon_equals(profile.length(), 4.0, 1e-9));
    }

    #[test]
    fn test_discontinuous_profile_invalid() {
        let mut profile = trapezoid();
        profile.append_segment(MotionSegment::new(
            MotionState::new(5.0, 100.0, 0.0, 0.0),
            MotionState::new(6.0, 100.0, 0.0, 0.0),
        ));

        assert!(!profile.is_valid());
    }
}
