//! Speed-scheduled lookahead distance

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use serde::{Deserialize, Serialize};

// Internal imports
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Maps speed to pure pursuit lookahead distance.
///
/// The distance is interpolated linearly between `min_distance_m` at
/// `min_speed_ms` and `max_distance_m` at `max_speed_ms`: a short lookahead
/// tracks tightly at low speed, a long one smooths the steering at high
/// speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lookahead {
    pub min_distance_m: f64,
    pub max_distance_m: f64,
    pub min_speed_ms: f64,
    pub max_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lookahead {
    pub fn new(
        min_distance_m: f64,
        max_distance_m: f64,
        min_speed_ms: f64,
        max_speed_ms: f64,
    ) -> Self {
        Self {
            min_distance_m,
            max_distance_m,
            min_speed_ms,
            max_speed_ms,
        }
    }

    /// The lookahead distance for a given speed, clamped into the distance
    /// range. A NaN speed gives the minimum distance.
    pub fn lookahead_for_speed(&self, speed_ms: f64) -> f64 {
        let distance_m = lin_map(
            (self.min_speed_ms, self.max_speed_ms),
            (self.min_distance_m, self.max_distance_m),
            speed_ms,
        );

        if distance_m.is_nan() {
            self.min_distance_m
        }
        else {
            clamp(&distance_m, &self.min_distance_m, &self.max_distance_m)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
