//! # Mirrored odometry
//!
//! Presents another source in a mirrored field frame, so that routines written for one side of
//! the field can be run from the other. Mirroring in X negates X and reflects the heading about
//! the Y axis, mirroring in Y negates Y and reflects the heading about the X axis.
//!
//! The transform is its own inverse, so poses set on the mirror are transformed the same way
//! before being passed to the inner source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use util::maths::wrap_pi;

use super::{OdomSource, Pose, SharedOdom};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct MirrorOdom {
    inner: SharedOdom,
    mirror_x: bool,
    mirror_y: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MirrorOdom {
    pub fn new(inner: SharedOdom, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            inner,
            mirror_x,
            mirror_y,
        }
    }

    fn transform(&self, mut pose: Pose) -> Pose {
        if self.mirror_x {
            pose.position[0] = -pose.position[0];
            pose.heading_rad = wrap_pi(PI - pose.heading_rad);
        }
        if self.mirror_y {
            pose.position[1] = -pose.position[1];
            pose.heading_rad = wrap_pi(-pose.heading_rad);
        }
        pose
    }
}

impl OdomSource for MirrorOdom {
    fn get_pose(&self) -> Pose {
        self.transform(self.inner.borrow().get_pose())
    }

    fn set_pose(&mut self, pose: Pose) {
        let inner_pose = self.transform(pose);
        self.inner.borrow_mut().set_pose(inner_pose);
    }

    fn update(&mut self) {
        self.inner.borrow_mut().update();
    }
}
