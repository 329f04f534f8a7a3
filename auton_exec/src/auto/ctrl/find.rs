//! # Find controller
//!
//! Navigates to a target around the obstacles of the occupancy grid. A path is planned from the
//! current pose with the [`PathPlanner`] and followed with a [`PursuitCtrl`]. The path is only
//! replanned when the target moves far enough from the target the current path was planned to.
//!
//! When planning fails the robot is stopped and planning is retried after a backoff, so a goal
//! which is temporarily unreachable (for example because of pose noise) doesn't replan every
//! cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::{info, warn};

use super::{Controller, FindParams};
use crate::{
    auto::{
        events::RaisedEvent,
        loc::{Pose, SharedOdom},
        nav::PathPlanner,
        traj::GeneratedTrajectory,
        traj_ctrl::{PursuitCtrl, PursuitParams},
    },
    chassis::DriveCmd,
};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct FindCtrl {
    params: FindParams,

    planner: PathPlanner,

    odom: SharedOdom,

    clock: Rc<dyn Clock>,

    /// Follows the planned path
    pursuit: PursuitCtrl,

    /// Requested target
    target: Pose,

    /// Target the current path was planned to, `None` if there's no path
    planned_target: Option<Pose>,

    /// Clock time before which planning won't be attempted again
    retry_at_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FindCtrl {
    pub fn new(
        params: FindParams,
        pursuit_params: PursuitParams,
        planner: PathPlanner,
        odom: SharedOdom,
        clock: Rc<dyn Clock>,
        target: Pose,
    ) -> Self {
        let pursuit = PursuitCtrl::new(
            pursuit_params,
            odom.clone(),
            GeneratedTrajectory::empty(),
        );

        Self {
            params,
            planner,
            odom,
            clock,
            pursuit,
            target,
            planned_target: None,
            retry_at_ms: None,
        }
    }

    /// Request a new target. A new path is only planned if the target has moved by more than the
    /// replan threshold.
    pub fn set_target(&mut self, target: Pose) {
        self.target = target;
    }

    /// True if a path exists to a target within the replan threshold of the requested target.
    pub fn has_path(&self) -> bool {
        match self.planned_target {
            Some(planned) => planned.distance(&self.target) <= self.params.replan_threshold_in,
            None => false,
        }
    }

    pub fn pursuit(&self) -> &PursuitCtrl {
        &self.pursuit
    }

    /// Plan to the current target, returning true on success.
    fn plan(&mut self) -> bool {
        let start = self.odom.borrow().get_pose();

        match self.planner.find_path(&start, &self.target) {
            Ok(traj) => {
                info!(
                    "Find planned a path to {:?} with {} waypoints",
                    self.target.position,
                    traj.waypoints().len()
                );
                self.pursuit.set_trajectory(traj);
                self.planned_target = Some(self.target);
                self.retry_at_ms = None;
                true
            }
            Err(e) => {
                warn!(
                    "Find could not plan to {:?}: {}, retrying in {} ms",
                    self.target.position, e, self.params.retry_backoff_ms
                );
                self.planned_target = None;
                self.retry_at_ms = Some(self.clock.now_ms() + self.params.retry_backoff_ms);
                false
            }
        }
    }
}

impl Controller for FindCtrl {
    fn name(&self) -> &'static str {
        "Find"
    }

    fn reset(&mut self) {
        self.pursuit.set_trajectory(GeneratedTrajectory::empty());
        self.planned_target = None;
        self.retry_at_ms = None;
    }

    fn update(&mut self) -> Option<DriveCmd> {
        if !self.has_path() {
            if let Some(retry_at_ms) = self.retry_at_ms {
                if self.clock.now_ms() < retry_at_ms {
                    return Some(DriveCmd::Stop);
                }
            }

            if !self.plan() {
                return Some(DriveCmd::Stop);
            }
        }

        self.pursuit.update()
    }

    fn is_finished(&self) -> bool {
        self.has_path() && self.pursuit.is_finished()
    }

    fn target_pose(&self) -> Option<Pose> {
        Some(self.target)
    }

    fn current_events(&self) -> &[RaisedEvent] {
        self.pursuit.current_events()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        loc::{shared, OdomSource, OnSetOdom},
        map::{Cell, FieldBounds, OccupancyGrid},
        nav::PathPlannerParams,
    };
    use util::time::ManualClock;

    /// 13x13 grid over a 144 in field, one cell per foot, with the given cells occupied.
    fn build(occupied: &[(usize, usize)], target: Pose) -> (FindCtrl, SharedOdom, Rc<ManualClock>) {
        let mut grid = OccupancyGrid::new(13, 13, FieldBounds::default()).unwrap();
        for (x, y) in occupied {
            grid.set_occupied(Cell::new(*x, *y), true);
        }
        let planner = PathPlanner::new(Rc::new(grid), PathPlannerParams::default());

        let odom: SharedOdom = shared(OnSetOdom::new(Pose::new(12.0, 12.0, 0.0)));
        let clock = Rc::new(ManualClock::new(0));

        let ctrl = FindCtrl::new(
            FindParams::default(),
            PursuitParams::default(),
            planner,
            odom.clone(),
            clock.clone(),
            target,
        );

        (ctrl, odom, clock)
    }

    #[test]
    fn test_plans_and_drives() {
        let (mut ctrl, _, _) = build(&[], Pose::new(120.0, 12.0, 0.0));

        assert!(!ctrl.has_path());
        match ctrl.update() {
            Some(DriveCmd::Move { forward, .. }) => assert!(forward > 0.0),
            other => panic!("Expected a move, got {:?}", other),
        }
        assert!(ctrl.has_path());
        assert!(!ctrl.is_finished());
    }

    #[test]
    fn test_replan_threshold() {
        let (mut ctrl, _, _) = build(&[], Pose::new(120.0, 12.0, 0.0));
        ctrl.update();
        let first = ctrl.pursuit().trajectory().clone();

        // Small moves of the target keep the path
        ctrl.set_target(Pose::new(120.0, 20.0, 0.0));
        assert!(ctrl.has_path());
        ctrl.update();
        assert_eq!(ctrl.pursuit().trajectory(), &first);

        // Larger ones replan
        ctrl.set_target(Pose::new(120.0, 60.0, 0.0));
        assert!(!ctrl.has_path());
        ctrl.update();
        assert!(ctrl.has_path());
        assert_ne!(ctrl.pursuit().trajectory(), &first);
    }

    #[test]
    fn test_backoff_on_failure() {
        // Target cell is occupied
        let (mut ctrl, _, clock) = build(&[(10, 1)], Pose::new(120.0, 12.0, 0.0));

        assert_eq!(ctrl.update(), Some(DriveCmd::Stop));
        assert!(!ctrl.has_path());
        assert!(!ctrl.is_finished());

        // Still backing off, even with a reachable target
        ctrl.set_target(Pose::new(120.0, 36.0, 0.0));
        clock.advance(100);
        assert_eq!(ctrl.update(), Some(DriveCmd::Stop));
        assert!(!ctrl.has_path());

        clock.advance(400);
        assert!(ctrl.update().is_some());
        assert!(ctrl.has_path());
    }

    #[test]
    fn test_finishes_at_target() {
        let (mut ctrl, odom, _) = build(&[], Pose::new(36.0, 12.0, 0.0));

        for k in 1..=20 {
            let x = (12.0 + 3.0 * k as f64).min(36.0);
            odom.borrow_mut().set_pose(Pose::new(x, 12.0, 0.0));
            ctrl.update();
            if ctrl.is_finished() {
                break;
            }
        }

        assert!(ctrl.is_finished());

        // Reset forgets the path
        ctrl.reset();
        assert!(!ctrl.has_path());
        assert!(!ctrl.is_finished());
    }
}
