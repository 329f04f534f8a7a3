//! Main autonomy executable entry point.
//!
//! # Architecture
//!
//! The executable runs an autonomous routine against the simulated robot:
//!
//!     - Initialise the session, logger and parameters
//!     - Load the path and occupancy grid, generate the path's trajectory
//!     - Build the odometry sources and the routine's controller tree
//!     - Main loop:
//!         - Odometry update
//!         - Routine update, drive command applied to the chassis
//!         - Event dispatch
//!         - Simulation step
//!
//! The routine follows the path, backs off, navigates around the field's obstacles to the find
//! target, and finally drives directly back to the start of the path.
//!
//! A single optional argument names the exec parameter file in the `params` directory, by default
//! `auton_exec.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::{
    cell::Cell,
    env,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

// Internal
use auton_lib::{
    auto::{
        ctrl::{Controller, DirectCtrl, FindCtrl, SeqList, TimedAction, Timeout},
        events::EventDispatcher,
        loc::{
            shared, AbsoluteOdom, FusedOdom, InertialOdom, MirrorOdom, OdomSource, OnSetOdom,
            Pose, SharedOdom, WheelOdom,
        },
        map::OccupancyGrid,
        nav::PathPlanner,
        path::Path,
        traj::TrajGenerator,
        traj_ctrl::{PursuitCtrl, PursuitParams},
    },
    chassis::Chassis,
    params::AutonExecParams,
    sim::SimRobot,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::{Clock, ManualClock, SessionClock},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default exec parameter file
const DEFAULT_PARAMS_FILE: &str = "auton_exec.toml";

/// Number of cycles between pose reports in the log
const POSE_REPORT_CYCLES: u64 = 50;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("auton_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Autonomy Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let params_file = match args.len() {
        1 => DEFAULT_PARAMS_FILE,
        2 => args[1].as_str(),
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    let params: AutonExecParams = util::params::load(params_file)
        .wrap_err_with(|| format!("Could not load exec params from {}", params_file))?;

    info!("Exec parameters loaded from {}", params_file);

    // ---- LOAD PATH AND MAP ----

    let root = host::get_sw_root().wrap_err("Could not find the software root")?;

    let path = Path::load(root.join(&params.path_file))
        .wrap_err_with(|| format!("Could not load the path {}", params.path_file))?;
    info!(
        "Loaded path {} with {} waypoints",
        params.path_file,
        path.len()
    );

    let grid = OccupancyGrid::load(root.join(&params.map_file), params.field_bounds)
        .wrap_err_with(|| format!("Could not load the map {}", params.map_file))?;
    info!(
        "Loaded {}x{} occupancy grid {}",
        grid.width(),
        grid.height(),
        params.map_file
    );

    // ---- GENERATE TRAJECTORY ----

    let traj = TrajGenerator::new(params.traj.clone()).generate(&path);
    info!(
        "Generated {:?} trajectory with {} samples",
        params.traj.mode,
        traj.len()
    );
    session.save_with_timestamp("trajectory.json", &traj);

    let start_pose = match traj.starting_pose() {
        Some(p) => p,
        None => {
            warn!("Path has no starting pose, starting from the field origin");
            Pose::default()
        }
    };

    // ---- INITIALISE SIMULATION AND ODOMETRY ----

    let mirror_x = params.odom.mirror_x;
    let mirror_y = params.odom.mirror_y;

    // Routines are authored for one side of the field, the robot really starts at the mirror of
    // the routine's start. Mirroring is its own inverse so the same wrapper maps both ways.
    let field_start = if mirror_x || mirror_y {
        MirrorOdom::new(shared(OnSetOdom::new(start_pose)), mirror_x, mirror_y).get_pose()
    } else {
        start_pose
    };

    let mut robot = SimRobot::new(params.sim.clone(), field_start);

    let wheel: SharedOdom = shared(WheelOdom::new(
        Box::new(robot.encoders()),
        params.odom.track_width_in,
        field_start,
    ));
    let absolute: SharedOdom = shared(AbsoluteOdom::new(
        Box::new(robot.position_sensor()),
        field_start,
    ));
    let inertial: SharedOdom = shared(InertialOdom::new(Box::new(robot.imu()), field_start));

    let fused: SharedOdom = shared(
        FusedOdom::new(vec![
            (wheel, params.odom.wheel_weight),
            (absolute, params.odom.absolute_weight),
            (inertial, params.odom.inertial_weight),
        ])
        .wrap_err("Could not build the fused odometry")?,
    );

    let odom: SharedOdom = if mirror_x || mirror_y {
        info!("Mirroring the field (x: {}, y: {})", mirror_x, mirror_y);
        shared(MirrorOdom::new(fused, mirror_x, mirror_y))
    } else {
        fused
    };

    // Mirroring a single axis swaps the handedness of turns
    let mirror_cmds = mirror_x != mirror_y;

    // Simulated time always advances by one cycle period per cycle. Real time runs follow the
    // session clock instead, so timeouts and debounces see the actual elapsed time.
    let sim_clock = Rc::new(ManualClock::new(0));
    let routine_clock: Rc<dyn Clock> = if params.real_time {
        Rc::new(SessionClock)
    } else {
        sim_clock.clone()
    };

    // ---- BUILD ROUTINE ----

    let pursuit = PursuitCtrl::new(params.pursuit.clone(), odom.clone(), traj);

    let back_off = TimedAction::new(
        params.back_off_forward,
        0.0,
        0.0,
        params.back_off_ms,
        routine_clock.clone(),
    );

    let (tx, ty, th) = params.find_target;
    let find = FindCtrl::new(
        params.find.clone(),
        PursuitParams {
            looping: false,
            ..params.pursuit.clone()
        },
        PathPlanner::new(Rc::new(grid), params.planner.clone()),
        odom.clone(),
        routine_clock.clone(),
        Pose::from_deg(tx, ty, th),
    );
    let find = Timeout::new(Box::new(find), params.find_timeout_ms, routine_clock.clone());

    let home = DirectCtrl::new(
        params.direct.clone(),
        odom.clone(),
        routine_clock.clone(),
        start_pose,
        false,
    );

    let children: Vec<Box<dyn Controller>> = vec![
        Box::new(pursuit),
        Box::new(back_off),
        Box::new(find),
        Box::new(home),
    ];
    let mut routine = SeqList::new(children, false, routine_clock.clone())
        .with_timeout((params.run_time_limit_s * 1000.0) as u64);

    // ---- REGISTER EVENT HANDLERS ----

    let mut dispatcher = EventDispatcher::new(params.events.clone());

    // Handlers can't borrow the chassis, speed changes are applied after dispatch
    let pending_speed = Rc::new(Cell::new(None));
    let speed_sink = pending_speed.clone();
    dispatcher.register("speed", move |p| match p.trim().parse::<f64>() {
        Ok(s) => speed_sink.set(Some(s)),
        Err(_) => warn!("Invalid speed event parameter \"{}\"", p),
    });

    for mech in ["intake", "lift", "clamp"].iter() {
        let name = *mech;
        dispatcher.register(name, move |p| info!("Mechanism {}: {}", name, p));
    }

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);
    let cycle_period_ms = (params.cycle_period_s * 1000.0).round() as u64;
    let mut num_cycles: u64 = 0;
    let mut active_index = routine.active_index();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- ODOMETRY ----

        odom.borrow_mut().update();

        // ---- ROUTINE ----

        if let Some(cmd) = routine.update() {
            let cmd = if mirror_cmds { cmd.mirrored() } else { cmd };
            cmd.apply(&mut robot);
        }

        if !routine.is_finished() && routine.active_index() != active_index {
            active_index = routine.active_index();
            info!("Routine stage {} started", active_index);
        }

        // ---- EVENTS ----

        dispatcher.dispatch(routine.current_events(), routine_clock.now_ms());
        if let Some(speed) = pending_speed.take() {
            info!("Speed set to {}", speed);
            robot.set_speed(speed);
        }

        if routine.is_finished() {
            break;
        }

        // ---- SIMULATION ----

        robot.step(params.cycle_period_s);
        sim_clock.advance(cycle_period_ms);
        num_cycles += 1;

        if num_cycles % POSE_REPORT_CYCLES == 0 {
            debug!(
                "Estimated pose {:?}, true pose {:?}",
                odom.borrow().get_pose().with_normalized_heading(),
                robot.pose().with_normalized_heading()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        if params.real_time {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                ),
            }
        }
    }

    // ---- SHUTDOWN ----

    robot.stop();

    let final_pose = odom.borrow().get_pose();
    info!(
        "Routine finished after {} cycles ({:.2} s simulated)",
        num_cycles,
        sim_clock.now_ms() as f64 / 1000.0
    );
    info!(
        "Final pose {:?}, {:.2} in from the start",
        final_pose.with_normalized_heading(),
        final_pose.distance(&start_pose)
    );
    session.save_with_timestamp("final_pose.json", &final_pose);

    info!("End of execution");

    Ok(())
}
