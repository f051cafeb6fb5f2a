//! # Path following demo
//!
//! Builds a path with a rounded corner, then drives a simulated unicycle
//! rover along it with the path follower, logging telemetry as it goes and
//! saving the driven trajectory into the session directory.
//!
//! Run from the workspace root so the parameter file can be found:
//!
//! ```sh
//! cargo run --example follow_path
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use serde::Serialize;

// Internal imports
use motion_ctrl::geom::RigidTransform2d;
use motion_ctrl::path::{
    build_path_from_waypoints, PathFollower, PathFollowerParams, Waypoint,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Control tick period.
const TICK_S: f64 = 0.01;

/// Give up if the path is not finished after this many ticks.
const MAX_TICKS: usize = 5000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One sample of the driven trajectory, for plotting.
#[derive(Debug, Clone, Copy, Serialize)]
struct TrajectorySample {
    t_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    speed_ms: f64,
    cross_track_error_m: f64,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // Session and logger setup
    let session = Session::new("follow_path", "sessions")
        .wrap_err("Failed to create the session")?;
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise the logger")?;

    // Load parameters
    let params: PathFollowerParams = util::params::load("params/path_follower.toml")
        .wrap_err("Failed to load path follower parameters")?;
    info!("Parameters loaded: {:#?}", params);

    // A 2 m run, a 0.5 m radius corner, and a 2 m run to a stop
    let path = build_path_from_waypoints(
        &[
            Waypoint::new(0.0, 0.0, 0.0, 0.5),
            Waypoint::new(2.0, 0.0, 0.5, 0.5),
            Waypoint::new(2.0, 2.0, 0.0, 0.5),
        ],
        params.profile_max_abs_acc_mss,
    )
    .wrap_err("Failed to build the path")?;
    info!(
        "Path built: {} segments, {:.3} m long",
        path.num_segments(),
        path.remaining_length_m()
    );

    let mut follower = PathFollower::new(path, &params);

    // Simulate a perfect unicycle plant
    let mut pose = RigidTransform2d::identity();
    let mut displacement_m = 0.0;
    let mut velocity_ms = 0.0;
    let mut trajectory: Vec<TrajectorySample> = Vec::new();

    for i in 1..=MAX_TICKS {
        let t = i as f64 * TICK_S;
        let twist = follower.update(t, &pose, displacement_m, velocity_ms);

        pose = pose.transform_by(&RigidTransform2d::exp(&twist.scaled(TICK_S)));
        displacement_m += twist.dx_m * TICK_S;
        velocity_ms = twist.dx_m;

        trajectory.push(TrajectorySample {
            t_s: t,
            x_m: pose.translation_m[0],
            y_m: pose.translation_m[1],
            heading_rad: pose.rotation.radians(),
            speed_ms: velocity_ms,
            cross_track_error_m: follower.cross_track_error_m(),
        });

        if i % 100 == 0 {
            info!(
                "t = {:5.2} s: pose ({:6.3}, {:6.3}) m, heading {:6.3} rad, \
                 speed {:5.3} m/s, cross track {:6.4} m",
                t,
                pose.translation_m[0],
                pose.translation_m[1],
                pose.rotation.radians(),
                velocity_ms,
                follower.cross_track_error_m()
            );
        }

        if follower.is_finished() {
            info!("Path finished after {:.2} s", t);
            break;
        }
    }

    if !follower.is_finished() {
        info!("Path not finished after {} ticks", MAX_TICKS);
    }

    info!(
        "Final pose ({:.3}, {:.3}) m, {:.3} m driven",
        pose.translation_m[0],
        pose.translation_m[1],
        displacement_m
    );

    // Save the trajectory for offline plotting
    session.save("trajectory.json", &trajectory);
    info!("Trajectory saved to {:?}", session.session_root);

    Ok(())
}
