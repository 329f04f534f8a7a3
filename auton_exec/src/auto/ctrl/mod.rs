//! # Controller module
//!
//! Autonomous routines are built as a tree of [`Controller`]s which is ticked once per control
//! cycle. Leaf controllers produce drive commands, composite controllers decide which of their
//! children is ticked:
//!
//! - [`PursuitCtrl`](crate::auto::traj_ctrl::PursuitCtrl) - follow a generated trajectory
//! - [`DirectCtrl`] - drive straight at a single target pose
//! - [`FindCtrl`] - plan around obstacles to a target and follow the plan
//! - [`TimedAction`] - drive a fixed command for a fixed time
//! - [`SeqList`] - run children one after the other, optionally looping
//! - [`Timeout`] - bound the run time of another controller
//!
//! Composite controllers own their children, the tree has no shared nodes or cycles.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod direct;
mod find;
mod params;
mod seq_list;
mod timed;
mod timeout;

pub use direct::DirectCtrl;
pub use find::FindCtrl;
pub use params::{DirectParams, FindParams};
pub use seq_list::SeqList;
pub use timed::TimedAction;
pub use timeout::Timeout;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::chassis::DriveCmd;

use super::{events::RaisedEvent, loc::Pose};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A node in the autonomous routine tree.
pub trait Controller {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return the controller to its initial state, ready to run again.
    ///
    /// Composite controllers reset all of their children.
    fn reset(&mut self);

    /// Tick the controller, returning the command the host should apply to the chassis.
    ///
    /// `None` means the controller has nothing to command this cycle.
    fn update(&mut self) -> Option<DriveCmd>;

    /// True once the controller has completed its task.
    fn is_finished(&self) -> bool;

    /// The pose the controller is currently driving to, if any.
    fn target_pose(&self) -> Option<Pose> {
        None
    }

    /// Events which have been reached and are currently active, tagged with the waypoint which
    /// raised them.
    fn current_events(&self) -> &[RaisedEvent] {
        &[]
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    //! Controllers used to test the composites.

    use super::*;
    use std::{cell::RefCell, rc::Rc};

    /// A controller which finishes after a set number of updates, recording how many times it
    /// was updated and reset.
    pub struct CountingCtrl {
        pub id: usize,
        pub finish_after: usize,
        pub updates: usize,
        pub log: Rc<RefCell<Vec<usize>>>,
        pub resets: Rc<RefCell<usize>>,
    }

    impl CountingCtrl {
        pub fn new(id: usize, finish_after: usize, log: Rc<RefCell<Vec<usize>>>) -> Self {
            Self {
                id,
                finish_after,
                updates: 0,
                log,
                resets: Rc::new(RefCell::new(0)),
            }
        }
    }

    impl Controller for CountingCtrl {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn reset(&mut self) {
            self.updates = 0;
            *self.resets.borrow_mut() += 1;
        }

        fn update(&mut self) -> Option<DriveCmd> {
            self.updates += 1;
            self.log.borrow_mut().push(self.id);
            Some(DriveCmd::new(self.id as f64 * 0.1, 0.0))
        }

        fn is_finished(&self) -> bool {
            self.updates >= self.finish_after
        }
    }
}
