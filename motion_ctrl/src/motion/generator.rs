//! Trapezoidal motion profile generation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::{
    CompletionBehavior, MotionProfile, MotionProfileConstraints,
    MotionProfileGoal, MotionSegment, MotionState,
};
use util::maths::sign_num;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the time-optimal profile taking `prev_state` to `goal` under
/// `constraints`.
///
/// The resulting profile starts at `prev_state` (with velocity and
/// acceleration clamped into the constraints) and is a trapezoid of at most
/// accelerate, cruise and decelerate phases, preceded by a braking phase if
/// the motion initially heads away from the goal. Goals that cannot be met
/// within the constraints are resolved according to the goal's completion
/// behavior.
pub fn generate_profile(
    constraints: &MotionProfileConstraints,
    goal: &MotionProfileGoal,
    prev_state: &MotionState,
) -> MotionProfile {
    let delta_pos = goal.pos() - prev_state.pos;

    if delta_pos < 0.0 || (delta_pos == 0.0 && prev_state.vel < 0.0) {
        // Negative displacement is solved as a positive displacement on the
        // mirrored axis
        return generate_flipped_profile(constraints, goal, prev_state);
    }

    // Clamp the start state into the constraints
    let mut start_state = MotionState::new(
        prev_state.t,
        prev_state.pos,
        sign_num(prev_state.vel)
            * prev_state.vel.abs().min(constraints.max_abs_vel),
        sign_num(prev_state.acc)
            * prev_state.acc.abs().min(constraints.max_abs_acc),
    );
    let mut profile = MotionProfile::from_state(start_state);
    let mut delta_pos = delta_pos;

    // If the motion is moving away from the goal the first phase is braking
    // to a stop
    if start_state.vel < 0.0 && delta_pos > 0.0 {
        let stopping_time = (start_state.vel / constraints.max_abs_acc).abs();

        profile.append_control(constraints.max_abs_acc, stopping_time);
        start_state = profile.end_state();
        delta_pos = goal.pos() - start_state.pos;
    }

    // Minimum achievable speed at the goal position when braking as hard as
    // the constraints allow over the remaining displacement
    let min_abs_vel_at_goal_sqr = start_state.vel * start_state.vel
        - 2.0 * constraints.max_abs_acc * delta_pos;
    let min_abs_vel_at_goal = min_abs_vel_at_goal_sqr.abs().sqrt();
    let max_abs_vel_at_goal = (start_state.vel * start_state.vel
        + 2.0 * constraints.max_abs_acc * delta_pos)
        .sqrt();

    let mut goal_vel = goal.max_abs_vel();
    let mut max_acc = constraints.max_abs_acc;

    if min_abs_vel_at_goal_sqr > 0.0
        && min_abs_vel_at_goal > goal.max_abs_vel() + goal.vel_tolerance()
    {
        // Goal velocity is unreachable within the acceleration constraint
        match goal.completion_behavior() {
            CompletionBehavior::ViolateMaxAbsVel => {
                // Arrive at the goal position as slow as possible, which is
                // still too fast
                goal_vel = min_abs_vel_at_goal;
            }
            CompletionBehavior::ViolateMaxAccel => {
                if delta_pos.abs() < goal.pos_tolerance() {
                    // Already at the goal but moving too fast: express the
                    // velocity change as a single zero-duration segment of
                    // unbounded deceleration
                    let end = profile.end_state();

                    profile.append_segment(MotionSegment::new(
                        MotionState::new(
                            end.t,
                            end.pos,
                            end.vel,
                            f64::NEG_INFINITY,
                        ),
                        MotionState::new(
                            end.t,
                            end.pos,
                            goal_vel,
                            f64::NEG_INFINITY,
                        ),
                    ));
                    profile.consolidate();
                    return profile;
                }

                // Allow a stronger deceleration, exactly enough to hit the
                // goal state
                max_acc = (goal_vel * goal_vel
                    - start_state.vel * start_state.vel)
                    .abs()
                    / (2.0 * delta_pos);
            }
            CompletionBehavior::Overshoot => {
                // Brake to a stop past the goal, then solve the way back as
                // a mirrored profile
                let stopping_time =
                    (start_state.vel / constraints.max_abs_acc).abs();

                profile.append_control(-constraints.max_abs_acc, stopping_time);
                profile.append_profile(&generate_flipped_profile(
                    constraints,
                    goal,
                    &profile.end_state(),
                ));
                profile.consolidate();
                return profile;
            }
        }
    }

    let goal_vel = goal_vel.min(max_abs_vel_at_goal);

    // Peak speed of the trapezoid: the constraint, or lower if there is not
    // enough room to get up and back down again
    let v_max = constraints.max_abs_vel.min(
        ((start_state.vel * start_state.vel + goal_vel * goal_vel) / 2.0
            + delta_pos * max_acc)
            .sqrt(),
    );

    if v_max > start_state.vel {
        let accel_time = (v_max - start_state.vel) / max_acc;

        profile.append_control(max_acc, accel_time);
        start_state = profile.end_state();
    }

    let distance_decel = 0.0f64.max(
        (start_state.vel * start_state.vel - goal_vel * goal_vel)
            / (2.0 * constraints.max_abs_acc),
    );
    let distance_cruise =
        0.0f64.max(goal.pos() - start_state.pos - distance_decel);

    if distance_cruise > 0.0 {
        profile.append_control(0.0, distance_cruise / start_state.vel);
        start_state = profile.end_state();
    }

    if distance_decel > 0.0 {
        profile.append_control(-max_acc, (start_state.vel - goal_vel) / max_acc);
    }

    profile.consolidate();
    profile
}

/// Generate a profile for a goal on the mirrored axis: flip the inputs,
/// solve, and flip the resulting segments back.
pub fn generate_flipped_profile(
    constraints: &MotionProfileConstraints,
    goal: &MotionProfileGoal,
    prev_state: &MotionState,
) -> MotionProfile {
    let mut profile =
        generate_profile(constraints, &goal.flipped(), &prev_state.flipped());

    for segment in profile.segments_mut() {
        segment.start = segment.start.flipped();
        segment.end = segment.end.flipped();
    }

    profile
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use util::maths::epsilon_equals;

    fn constraints(max_abs_vel: f64, max_abs_acc: f64) -> MotionProfileConstraints {
        MotionProfileConstraints {
            max_abs_vel,
            max_abs_acc,
        }
    }

    #[test]
    fn test_full_trapezoid() {
        let constraints = constraints(5.0, 10.0);
        let goal = MotionProfileGoal::new(
            6.3,
            0.0,
            CompletionBehavior::Overshoot,
            0.05,
            0.1,
        );
        let start = MotionState::new(0.0, 0.0, 0.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());
        assert_eq!(profile.num_segments(), 3);

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 6.3, 1e-9));
        assert!(epsilon_equals(end.vel, 0.0, 1e-9));

        // Accel phase: 0.5 s to reach 5, covering 1.25
        let segments = profile.segments();
        assert!(epsilon_equals(segments[0].end.t, 0.5, 1e-9));
        assert!(epsilon_equals(segments[0].end.vel, 5.0, 1e-9));
        assert!(epsilon_equals(segments[0].end.pos, 1.25, 1e-9));

        // Cruise covers 6.3 - 2 * 1.25 = 3.8 at 5
        assert!(epsilon_equals(segments[1].end.t, 0.5 + 0.76, 1e-9));
        assert!(epsilon_equals(segments[1].end.vel, 5.0, 1e-9));

        // Decel brings the speed back to zero
        assert!(epsilon_equals(end.t, 1.76, 1e-9));
    }

    #[test]
    fn test_negative_goal_is_mirrored() {
        let constraints = constraints(5.0, 10.0);
        let start = MotionState::new(0.0, 0.0, 0.0, 0.0);

        let forward = generate_profile(
            &constraints,
            &MotionProfileGoal::new(
                6.3,
                0.0,
                CompletionBehavior::Overshoot,
                0.05,
                0.1,
            ),
            &start,
        );
        let backward = generate_profile(
            &constraints,
            &MotionProfileGoal::new(
                -6.3,
                0.0,
                CompletionBehavior::Overshoot,
                0.05,
                0.1,
            ),
            &start,
        );

        assert!(backward.is_valid());
        assert_eq!(forward.num_segments(), backward.num_segments());

        for (f, b) in forward
            .segments()
            .iter()
            .zip(backward.segments().iter())
        {
            assert!(epsilon_equals(f.end.pos, -b.end.pos, 1e-9));
            assert!(epsilon_equals(f.end.vel, -b.end.vel, 1e-9));
            assert!(epsilon_equals(f.end.t, b.end.t, 1e-9));
        }
    }

    #[test]
    fn test_triangular_profile() {
        // Not enough room to reach the velocity limit
        let constraints = constraints(10.0, 1.0);
        let goal = MotionProfileGoal::from_pos(1.0);
        let start = MotionState::new(0.0, 0.0, 0.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());
        assert_eq!(profile.num_segments(), 2);

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 1.0, 1e-6));
        assert!(epsilon_equals(end.vel, 0.0, 1e-6));

        // Peak speed is sqrt(d * a) = 1
        assert!(epsilon_equals(profile.segments()[0].end.vel, 1.0, 1e-9));
    }

    #[test]
    fn test_initial_velocity_away_from_goal() {
        // Moving backwards while the goal is ahead: brake first
        let constraints = constraints(5.0, 10.0);
        let goal = MotionProfileGoal::from_pos(2.0);
        let start = MotionState::new(0.0, 0.0, -2.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 2.0, 1e-6));
        assert!(epsilon_equals(end.vel, 0.0, 1e-6));

        // First phase is braking from -2 to 0, drifting backwards
        let first = profile.segments()[0];
        assert!(epsilon_equals(first.start.vel, -2.0, 1e-9));
        assert!(epsilon_equals(first.end.vel, 0.0, 1e-9));
        assert!(first.end.pos < 0.0);
    }

    #[test]
    fn test_violate_max_accel_at_goal() {
        // At the goal but moving too fast: a single instantaneous velocity
        // change segment
        let constraints = constraints(5.0, 1.0);
        let goal = MotionProfileGoal::new(
            0.0,
            0.0,
            CompletionBehavior::ViolateMaxAccel,
            0.1,
            0.01,
        );
        let start = MotionState::new(0.0, 0.0, 3.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());
        assert_eq!(profile.num_segments(), 1);

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 0.0, 1e-9));
        assert!(epsilon_equals(end.vel, 0.0, 1e-9));
        assert!(epsilon_equals(end.t, 0.0, 1e-9));
    }

    #[test]
    fn test_violate_max_accel_short_of_goal() {
        // Too fast to stop in time: deceleration exceeds the constraint so
        // the goal state is still hit exactly
        let constraints = constraints(10.0, 1.0);
        let goal = MotionProfileGoal::new(
            1.0,
            0.0,
            CompletionBehavior::ViolateMaxAccel,
            1e-3,
            1e-2,
        );
        let start = MotionState::new(0.0, 0.0, 4.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 1.0, 1e-6));
        assert!(epsilon_equals(end.vel, 0.0, 1e-6));

        // The braking acceleration used is v^2 / (2 d) = 8
        assert!(epsilon_equals(profile.segments()[0].start.acc, -8.0, 1e-6));
    }

    #[test]
    fn test_violate_max_abs_vel() {
        // Too fast to stop in time, but position is sacred: arrive fast
        let constraints = constraints(10.0, 1.0);
        let goal = MotionProfileGoal::new(
            1.0,
            0.0,
            CompletionBehavior::ViolateMaxAbsVel,
            1e-3,
            1e-2,
        );
        let start = MotionState::new(0.0, 0.0, 4.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 1.0, 1e-6));

        // Arrival speed is sqrt(v^2 - 2 a d) = sqrt(14)
        assert!(epsilon_equals(end.vel, 14.0f64.sqrt(), 1e-6));
    }

    #[test]
    fn test_overshoot_returns_to_goal() {
        // Overshoot goal moving too fast to stop: pass the goal, stop, come
        // back
        let constraints = constraints(10.0, 1.0);
        let goal = MotionProfileGoal::new(
            1.0,
            0.0,
            CompletionBehavior::Overshoot,
            1e-3,
            1e-2,
        );
        let start = MotionState::new(0.0, 0.0, 4.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());

        let end = profile.end_state();
        assert!(epsilon_equals(end.pos, 1.0, 1e-6));
        assert!(epsilon_equals(end.vel, 0.0, 1e-6));

        // The profile passes beyond the goal before returning
        let peak_pos = profile
            .segments()
            .iter()
            .map(|s| s.end.pos)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(peak_pos > 1.0);
    }

    #[test]
    fn test_cruise_only() {
        // Already at the velocity limit with the goal requesting it
        let constraints = constraints(2.0, 10.0);
        let goal = MotionProfileGoal::new(
            4.0,
            2.0,
            CompletionBehavior::ViolateMaxAccel,
            1e-3,
            1e-2,
        );
        let start = MotionState::new(0.0, 0.0, 2.0, 0.0);

        let profile = generate_profile(&constraints, &goal, &start);

        assert!(profile.is_valid());
        assert_eq!(profile.num_segments(), 1);

        let end = profile.end_state();
        assert!(epsilon_equals(end.t, 2.0, 1e-9));
        assert!(epsilon_equals(end.pos, 4.0, 1e-9));
        assert!(epsilon_equals(end.vel, 2.0, 1e-9));
    }
}
