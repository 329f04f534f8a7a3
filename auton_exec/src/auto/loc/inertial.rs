//! # Inertial odometry
//!
//! Heading from an inertial sensor. The sensor's zero is arbitrary so an offset is kept which
//! maps the raw heading onto the field frame. The position is not observable from this source,
//! it reports whatever position was last set.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::wrap_pi;

use super::{sensors::HeadingSensor, OdomSource, Pose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct InertialOdom {
    sensor: Box<dyn HeadingSensor>,

    pose: Pose,

    /// Last raw reading from the sensor
    raw_heading_rad: f64,

    /// Added to the raw heading to give the field heading
    offset_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InertialOdom {
    pub fn new(mut sensor: Box<dyn HeadingSensor>, start_pose: Pose) -> Self {
        let raw_heading_rad = sensor.heading_rad();
        Self {
            sensor,
            pose: start_pose,
            raw_heading_rad,
            offset_rad: start_pose.heading_rad - raw_heading_rad,
        }
    }
}

impl OdomSource for InertialOdom {
    fn get_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.offset_rad = pose.heading_rad - self.raw_heading_rad;
        self.pose = pose;
    }

    fn update(&mut self) {
        self.raw_heading_rad = self.sensor.heading_rad();
        self.pose.heading_rad = wrap_pi(self.raw_heading_rad + self.offset_rad);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::{cell::Cell, f64::consts::PI, rc::Rc};

    struct TestImu(Rc<Cell<f64>>);

    impl HeadingSensor for TestImu {
        fn heading_rad(&mut self) -> f64 {
            self.0.get()
        }
    }

    #[test]
    fn test_offset() {
        let raw = Rc::new(Cell::new(1.0));
        let mut odom = InertialOdom::new(Box::new(TestImu(raw.clone())), Pose::new(2.0, 3.0, 0.0));

        // Zeroed at construction
        odom.update();
        assert_relative_eq!(odom.get_pose().heading_rad, 0.0);

        raw.set(1.5);
        odom.update();
        assert_relative_eq!(odom.get_pose().heading_rad, 0.5);
        assert_relative_eq!(odom.get_pose().x(), 2.0);
        assert_relative_eq!(odom.get_pose().y(), 3.0);

        // Re-zero to face -X, heading is wrapped
        odom.set_pose(Pose::new(0.0, 0.0, PI));
        raw.set(1.7);
        odom.update();
        assert_relative_eq!(odom.get_pose().heading_rad, -PI + 0.2, epsilon = 1e-9);
        assert_relative_eq!(odom.get_pose().x(), 0.0);
    }
}
