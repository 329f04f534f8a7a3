//! # Direct controller
//!
//! Drives straight at a single target pose with separate forward and turn feedback loops. The
//! forward loop acts on the distance to the target along the robot's heading, the turn loop on
//! the bearing of the target relative to the robot's heading. When reversing the bearing is taken
//! from the back of the robot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{f64::consts::PI, rc::Rc};

use log::debug;

use super::{Controller, DirectParams};
use crate::{
    auto::{
        loc::{Pose, SharedOdom},
        traj_ctrl::PidController,
    },
    chassis::{clamp_unit, DriveCmd},
};
use util::{maths::get_ang_dist, time::Clock};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct DirectCtrl {
    params: DirectParams,

    odom: SharedOdom,

    clock: Rc<dyn Clock>,

    /// Pose being driven to
    target: Pose,

    /// Drive backwards to the target
    reverse: bool,

    forward_ctrl: PidController,
    turn_ctrl: PidController,

    finished: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DirectCtrl {
    pub fn new(
        params: DirectParams,
        odom: SharedOdom,
        clock: Rc<dyn Clock>,
        target: Pose,
        reverse: bool,
    ) -> Self {
        let forward_ctrl = PidController::new(params.forward_gains);
        let turn_ctrl = PidController::new(params.turn_gains);

        Self {
            params,
            odom,
            clock,
            target,
            reverse,
            forward_ctrl,
            turn_ctrl,
            finished: false,
        }
    }

    /// Change the target, re-arming the controller.
    pub fn set_target(&mut self, target: Pose) {
        self.target = target;
        self.finished = false;
    }
}

impl Controller for DirectCtrl {
    fn name(&self) -> &'static str {
        "Direct"
    }

    fn reset(&mut self) {
        self.forward_ctrl.reset();
        self.turn_ctrl.reset();
        self.finished = false;
    }

    fn update(&mut self) -> Option<DriveCmd> {
        let pose = self.odom.borrow().get_pose();

        if pose.distance(&self.target) <= self.params.position_tolerance_in {
            if !self.finished {
                debug!("Direct reached {:?}", self.target.position);
            }
            self.finished = true;
        }

        if self.finished {
            return Some(DriveCmd::Stop);
        }

        let mut bearing_rad = pose.bearing_to(&self.target.position);
        if self.reverse {
            bearing_rad += PI;
        }
        let bearing_err_rad = get_ang_dist(pose.heading_rad, bearing_rad);

        // Forward offset of the target in the robot frame, negative when it's behind
        let forward_offset_in = pose.to_local(&self.target.position)[0];

        let time_s = self.clock.now_ms() as f64 / 1000.0;
        let forward = self.forward_ctrl.get(forward_offset_in, time_s);
        let turn = self.turn_ctrl.get(bearing_err_rad, time_s);

        Some(DriveCmd::new(clamp_unit(forward), clamp_unit(turn)))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn target_pose(&self) -> Option<Pose> {
        Some(self.target)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::loc::{shared, OdomSource, OnSetOdom};
    use util::time::ManualClock;

    fn build(start: Pose, target: Pose, reverse: bool) -> (DirectCtrl, SharedOdom) {
        let odom: SharedOdom = shared(OnSetOdom::new(start));
        let clock = Rc::new(ManualClock::new(0));
        let ctrl = DirectCtrl::new(
            DirectParams::default(),
            odom.clone(),
            clock,
            target,
            reverse,
        );
        (ctrl, odom)
    }

    fn move_cmd(cmd: Option<DriveCmd>) -> (f64, f64) {
        match cmd {
            Some(DriveCmd::Move { forward, turn, .. }) => (forward, turn),
            other => panic!("Expected a move, got {:?}", other),
        }
    }

    #[test]
    fn test_drives_towards_target() {
        // Target ahead and to the left
        let (mut ctrl, _) = build(Pose::default(), Pose::new(20.0, 10.0, 0.0), false);
        let (forward, turn) = move_cmd(ctrl.update());

        assert!(forward > 0.0);
        assert!(turn > 0.0);
        assert!(!ctrl.is_finished());
    }

    #[test]
    fn test_reverse() {
        // Target directly behind, reversing should back straight onto it
        let (mut ctrl, _) = build(Pose::default(), Pose::new(-20.0, 0.0, 0.0), true);
        let (forward, turn) = move_cmd(ctrl.update());

        assert!(forward < 0.0);
        assert!(turn.abs() < 1e-9);
    }

    #[test]
    fn test_finishes_in_tolerance() {
        let (mut ctrl, odom) = build(Pose::default(), Pose::new(20.0, 0.0, 0.0), false);
        ctrl.update();
        assert!(!ctrl.is_finished());

        odom.borrow_mut().set_pose(Pose::new(19.0, 0.5, 0.0));
        assert_eq!(ctrl.update(), Some(DriveCmd::Stop));
        assert!(ctrl.is_finished());

        // A new target re-arms
        ctrl.set_target(Pose::new(40.0, 0.0, 0.0));
        assert!(!ctrl.is_finished());
        let (forward, _) = move_cmd(ctrl.update());
        assert!(forward > 0.0);
    }
}
