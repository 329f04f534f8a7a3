//! # Pursuit controller
//!
//! Follows a [`GeneratedTrajectory`] by steering towards a lookahead sample. Each cycle:
//!
//! 1. The pose is read from the bound odometry source.
//! 2. A window of samples starting at (and including) the current sample is searched for the one
//!    whose distance from the robot is closest to the lookahead distance. That sample becomes the
//!    target. The sample index only ever moves forward within a pass.
//! 3. A window of waypoints starting at (and including) the current waypoint is searched for the
//!    nearest one within the event radius. If one is found it becomes the reached waypoint and its
//!    events are made current, tagged with the waypoint's index.
//! 4. The target is expressed in the robot frame, giving a forward offset and a heading error.
//!    On reversed stretches the heading error is measured from the back of the robot.
//! 5. Both are scaled by their gains, clamped to [-1, 1] and scaled down by the safety factor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::PI;

use log::{debug, info, trace, warn};
use ordered_float::NotNan;

// Internal
use super::PursuitParams;
use crate::{
    auto::{
        ctrl::Controller,
        events::RaisedEvent,
        loc::{Pose, SharedOdom},
        traj::GeneratedTrajectory,
    },
    chassis::{clamp_unit, DriveCmd},
};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lookahead pursuit of a generated trajectory.
pub struct PursuitCtrl {
    params: PursuitParams,

    odom: SharedOdom,

    traj: GeneratedTrajectory,

    /// Index of the current target sample
    sample_index: usize,

    /// Index of the last waypoint reached, the start of the waypoint search window
    waypoint_index: usize,

    /// The waypoint reached on the last update, if any
    reached_waypoint: Option<usize>,

    /// Events of the reached waypoint
    current_events: Vec<RaisedEvent>,

    /// Number of completed passes, only ever above zero when looping
    passes: usize,

    finished: bool,

    /// Set once the empty trajectory warning has been issued
    warned_empty: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PursuitCtrl {
    pub fn new(params: PursuitParams, odom: SharedOdom, traj: GeneratedTrajectory) -> Self {
        let mut ctrl = Self {
            params,
            odom,
            traj,
            sample_index: 0,
            waypoint_index: 0,
            reached_waypoint: None,
            current_events: Vec::new(),
            passes: 0,
            finished: false,
            warned_empty: false,
        };
        ctrl.reset();
        ctrl
    }

    /// Replace the trajectory being followed and start again from its beginning.
    pub fn set_trajectory(&mut self, traj: GeneratedTrajectory) {
        self.traj = traj;
        self.reset();
    }

    pub fn trajectory(&self) -> &GeneratedTrajectory {
        &self.traj
    }

    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn reached_waypoint(&self) -> Option<usize> {
        self.reached_waypoint
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Find the sample in the search window closest to the lookahead distance from the pose.
    fn select_sample(&self, pose: &Pose) -> usize {
        let last = self.traj.len() - 1;
        let end = window_end(self.sample_index, self.params.sample_window, last);

        // Once the end of the trajectory is inside the lookahead circle the end is the target,
        // otherwise a robot which has overshot the end would keep chasing the samples behind it.
        if end == last && pose.distance(&self.traj.samples()[last]) <= self.params.lookahead_in {
            return last;
        }

        (self.sample_index..=end)
            .filter_map(|i| {
                let dist = pose.distance(&self.traj.samples()[i]);
                NotNan::new((dist - self.params.lookahead_in).abs())
                    .ok()
                    .map(|err| (i, err))
            })
            .min_by_key(|(_, err)| *err)
            .map(|(i, _)| i)
            .unwrap_or(self.sample_index)
    }

    /// Check the waypoint window for a reached waypoint, updating the current events.
    fn check_waypoints(&mut self, pose: &Pose) {
        self.current_events.clear();
        self.reached_waypoint = None;

        let last = self.traj.waypoints().len() - 1;
        let end = window_end(self.waypoint_index, self.params.waypoint_window, last);

        let nearest = (self.waypoint_index..=end)
            .filter_map(|j| {
                let dist = pose.distance(&self.traj.waypoints()[j].pose());
                if dist <= self.params.event_radius_in {
                    NotNan::new(dist).ok().map(|d| (j, d))
                } else {
                    None
                }
            })
            .min_by_key(|(_, d)| *d)
            .map(|(j, _)| j);

        if let Some(j) = nearest {
            if j != self.waypoint_index {
                debug!("Pursuit reached waypoint {}", j);
            }
            self.waypoint_index = j;
            self.reached_waypoint = Some(j);
            self.current_events = self.traj.waypoints()[j]
                .events
                .iter()
                .map(|e| RaisedEvent::new(j, e.clone()))
                .collect();
        }
    }

    /// Compute the drive command steering towards the target sample.
    fn steer(&self, pose: &Pose) -> DriveCmd {
        let target = &self.traj.samples()[self.sample_index];
        let local = pose.to_local(&target.position);

        let forward_offset_in = local[0];
        let mut heading_err_rad = local[1].atan2(local[0]);

        if self.traj.is_reversed(self.sample_index) {
            heading_err_rad = wrap_pi(heading_err_rad + PI);
        }

        let scale = self.params.safety_scale;
        DriveCmd::new(
            clamp_unit(forward_offset_in * self.params.k_forward) * scale,
            clamp_unit(heading_err_rad * self.params.k_turn) * scale,
        )
    }
}

impl Controller for PursuitCtrl {
    fn name(&self) -> &'static str {
        "Pursuit"
    }

    fn reset(&mut self) {
        self.sample_index = 0;
        self.waypoint_index = 0;
        self.reached_waypoint = None;
        self.current_events.clear();
        self.passes = 0;
        self.warned_empty = false;

        // Nothing to follow means nothing to wait for
        self.finished = self.traj.is_empty();
    }

    fn update(&mut self) -> Option<DriveCmd> {
        if self.traj.is_empty() {
            if !self.warned_empty {
                warn!("Pursuit has an empty trajectory, nothing to follow");
                self.warned_empty = true;
            }
            return None;
        }

        if self.finished {
            return Some(DriveCmd::Stop);
        }

        let pose = self.odom.borrow().get_pose();

        self.sample_index = self.select_sample(&pose);
        self.check_waypoints(&pose);

        trace!(
            "Pursuit sample {}/{}, waypoint {}",
            self.sample_index,
            self.traj.len() - 1,
            self.waypoint_index
        );

        let last = self.traj.len() - 1;
        let at_end = self.sample_index == last
            && pose.distance(&self.traj.samples()[last]) <= self.params.finish_tolerance_in;

        if at_end {
            if self.params.looping {
                self.passes += 1;
                debug!("Pursuit completed pass {}, restarting", self.passes);
                self.sample_index = 0;
                self.waypoint_index = 0;
            } else {
                info!("Pursuit reached the end of the trajectory");
                self.finished = true;
                return Some(DriveCmd::Stop);
            }
        }

        Some(self.steer(&pose))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn target_pose(&self) -> Option<Pose> {
        self.traj.samples().get(self.sample_index).copied()
    }

    fn current_events(&self) -> &[RaisedEvent] {
        &self.current_events
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Last index of a search window of `window` entries starting at `start`, which always includes
/// `start` itself.
fn window_end(start: usize, window: usize, last: usize) -> usize {
    (start + window.max(1) - 1).min(last)
}
