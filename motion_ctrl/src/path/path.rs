//! Ordered sequence of path segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// Internal imports
use super::{Lookahead, PathSegment, SEGMENT_COMPLETION_TOLERANCE_M};
use crate::motion::MotionState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the steering controller needs to know about the rover's
/// relationship to the path this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetPoint {
    /// Point on the active segment closest to the rover.
    pub closest_point_m: Vector2<f64>,

    /// Straight line distance from the rover to the closest point.
    pub closest_point_distance_m: f64,

    /// Planned speed at the closest point.
    pub closest_point_speed_ms: f64,

    /// Path distance from the closest point to the end of the active
    /// segment.
    pub remaining_segment_distance_m: f64,

    /// Path distance from the closest point to the end of the path.
    pub remaining_path_distance_m: f64,

    /// Speed limit of the segment holding the lookahead point.
    pub max_speed_ms: f64,

    /// The point the steering controller aims for.
    pub lookahead_point_m: Vector2<f64>,

    /// Planned speed at the lookahead point.
    pub lookahead_point_speed_ms: f64,
}

/// A piecewise path of lines and arcs, consumed front to back as the rover
/// drives it.
///
/// The front segment is the active one; once the rover has nearly finished
/// it the segment is dequeued. The final segment is never removed, so the
/// path always has geometry to steer against while stopping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    segments: VecDeque<PathSegment>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    pub(crate) fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Total remaining length of all segments still queued.
    pub fn remaining_length_m(&self) -> f64 {
        self.segments.iter().map(|s| s.length_m()).sum()
    }

    /// Allow the lookahead point to extrapolate beyond the final segment.
    pub fn extrapolate_last(&mut self) {
        if let Some(last) = self.segments.back_mut() {
            last.set_extrapolate_lookahead(true);
        }
    }

    /// The motion state at the end of the path's speed plan, re-anchored at
    /// time and position zero.
    ///
    /// Used to seed the speed profile of a segment appended after this path.
    pub fn last_motion_state(&self) -> MotionState {
        match self.segments.back() {
            Some(last) => {
                let end = last.end_state();
                MotionState::new(0.0, 0.0, end.vel, end.acc)
            }
            None => MotionState::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Compute the target point for the rover at `position_m`, advancing
    /// the active segment if it is complete.
    ///
    /// Returns `None` only for an empty path.
    pub fn target_point(
        &mut self,
        position_m: &Vector2<f64>,
        lookahead: &Lookahead,
    ) -> Option<TargetPoint> {
        let current = self.segments.front()?;

        let closest_point_m = current.closest_point(position_m);
        let closest_point_distance_m = (position_m - closest_point_m).norm();
        let remaining_segment_distance_m =
            current.remaining_distance(&closest_point_m);

        let mut remaining_path_distance_m = remaining_segment_distance_m;
        for segment in self.segments.iter().skip(1) {
            remaining_path_distance_m += segment.length_m();
        }

        let closest_point_speed_ms = current.speed_by_distance(
            current.length_m() - remaining_segment_distance_m,
        );

        // The lookahead distance is measured along the path from the closest
        // point, plus the rover's offset from the path so that a rover far
        // off the path aims further along it
        let mut lookahead_distance_m =
            lookahead.lookahead_for_speed(closest_point_speed_ms)
                + closest_point_distance_m;

        // Walk forward through the segments to find the one holding the
        // lookahead point
        let mut target_index = 0;

        if remaining_segment_distance_m < lookahead_distance_m
            && self.segments.len() > 1
        {
            lookahead_distance_m -= remaining_segment_distance_m;

            for i in 1..self.segments.len() {
                target_index = i;
                let length_m = self.segments[i].length_m();

                if length_m < lookahead_distance_m
                    && i < self.segments.len() - 1
                {
                    lookahead_distance_m -= length_m;
                }
                else {
                    break;
                }
            }
        }
        else {
            // Lookahead stays on the active segment: convert the distance to
            // be measured from the segment start
            lookahead_distance_m +=
                current.length_m() - remaining_segment_distance_m;
        }

        let target_segment = &self.segments[target_index];

        let target = TargetPoint {
            closest_point_m,
            closest_point_distance_m,
            closest_point_speed_ms,
            remaining_segment_distance_m,
            remaining_path_distance_m,
            max_speed_ms: target_segment.max_speed_ms(),
            lookahead_point_m: target_segment
                .point_by_distance(lookahead_distance_m),
            lookahead_point_speed_ms: target_segment
                .speed_by_distance(lookahead_distance_m),
        };

        self.check_segment_done(&closest_point_m);

        Some(target)
    }

    /// Dequeue the active segment once the rover is nearly at its end. The
    /// final segment is kept.
    fn check_segment_done(&mut self, closest_point_m: &Vector2<f64>) {
        if self.segments.len() < 2 {
            return;
        }

        let remaining_m = match self.segments.front() {
            Some(segment) => segment.remaining_distance(closest_point_m),
            None => return,
        };

        if remaining_m < SEGMENT_COMPLETION_TOLERANCE_M {
            self.segments.pop_front();
            debug!(
                "Path segment complete ({:.3} m remaining), {} segment(s) left",
                remaining_m,
                self.segments.len()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use crate::motion::MotionState;
    use util::maths::epsilon_equals;

    /// Two 2 m lines along +x, speed limit 1, stopping at the end.
    fn two_line_path() -> Path {
        let first = PathSegment::new_line(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            1.0,
            &MotionState::new(0.0, 0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        let second = PathSegment::new_line(
            Vector2::new(2.0, 0.0),
            Vector2::new(4.0, 0.0),
            1.0,
            &MotionState::new(0.0, 0.0, first.end_state().vel, 0.0),
            0.0,
            1.0,
        );

        Path::from_segments(vec![first, second])
    }

    fn lookahead() -> Lookahead {
        Lookahead::new(0.5, 1.0, 0.1, 1.0)
    }

    #[test]
    fn test_target_point_on_first_segment() {
        let mut path = two_line_path();

        let target = path
            .target_point(&Vector2::new(0.5, 0.1), &lookahead())
            .unwrap();

        assert!(epsilon_equals(target.closest_point_m[0], 0.5, 1e-9));
        assert!(epsilon_equals(target.closest_point_m[1], 0.0, 1e-9));
        assert!(epsilon_equals(target.closest_point_distance_m, 0.1, 1e-9));
        assert!(epsilon_equals(target.remaining_segment_distance_m, 1.5, 1e-9));
        assert!(epsilon_equals(target.remaining_path_distance_m, 3.5, 1e-9));

        // Lookahead point is ahead of the closest point along the path
        assert!(target.lookahead_point_m[0] > 1.0);
        assert!(epsilon_equals(target.lookahead_point_m[1], 0.0, 1e-9));

        // Neither segment was dequeued
        assert_eq!(path.num_segments(), 2);
    }

    #[test]
    fn test_lookahead_crosses_segments() {
        let mut path = two_line_path();

        // Near the end of the first segment the lookahead lands on the
        // second
        let target = path
            .target_point(&Vector2::new(1.8, 0.0), &lookahead())
            .unwrap();

        assert!(target.lookahead_point_m[0] > 2.0);
    }

    #[test]
    fn test_segment_dequeued_when_done() {
        let mut path = two_line_path();

        let _ = path.target_point(&Vector2::new(1.95, 0.0), &lookahead());
        assert_eq!(path.num_segments(), 1);

        // The final segment is never removed
        let _ = path.target_point(&Vector2::new(3.99, 0.0), &lookahead());
        assert_eq!(path.num_segments(), 1);
    }

    #[test]
    fn test_last_motion_state() {
        let path = two_line_path();

        // The path ends at rest
        let last = path.last_motion_state();
        assert!(epsilon_equals(last.vel, 0.0, 1e-2));
        assert!(epsilon_equals(last.t, 0.0, 1e-9));
        assert!(epsilon_equals(last.pos, 0.0, 1e-9));
    }

    #[test]
    fn test_extrapolate_last_extends_lookahead() {
        let line = PathSegment::new_line(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            1.0,
            &MotionState::new(0.0, 0.0, 0.0, 0.0),
            0.0,
            1.0,
        );
        let mut path = Path::from_segments(vec![line]);

        // Near the path end the lookahead overruns the final segment and is
        // clamped to its endpoint
        let target = path
            .target_point(&Vector2::new(1.9, 0.0), &lookahead())
            .unwrap();
        assert!(epsilon_equals(target.lookahead_point_m[0], 2.0, 1e-9));
        assert!(epsilon_equals(target.lookahead_point_m[1], 0.0, 1e-9));

        // With extrapolation enabled the lookahead point continues past the
        // endpoint along the line
        path.extrapolate_last();
        let target = path
            .target_point(&Vector2::new(1.9, 0.0), &lookahead())
            .unwrap();
        assert!(target.lookahead_point_m[0] > 2.0);
        assert!(epsilon_equals(target.lookahead_point_m[1], 0.0, 1e-9));
    }

    #[test]
    fn test_remaining_length() {
        let path = two_line_path();
        assert!(epsilon_equals(path.remaining_length_m(), 4.0, 1e-9));
    }
}
