//! # Wheel odometry
//!
//! Dead reckoning from the left and right wheel encoders of a differential drive. Each update
//! takes the change in distance of both wheels since the last update and integrates it along the
//! arc those deltas describe.
//!
//! Integration is purely distance based, so it doesn't depend on the tick rate at which it's
//! called.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;

use super::{sensors::Encoders, OdomSource, Pose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Differential wheel odometry.
pub struct WheelOdom {
    encoders: Box<dyn Encoders>,

    /// Distance between the wheels in inches
    track_width_in: f64,

    /// Current estimate
    pose: Pose,

    /// Encoder distances at the last update, `None` until the first update
    prev_dist_in: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelOdom {
    pub fn new(encoders: Box<dyn Encoders>, track_width_in: f64, start_pose: Pose) -> Self {
        Self {
            encoders,
            track_width_in,
            pose: start_pose,
            prev_dist_in: None,
        }
    }

    /// Integrate a pair of wheel distance deltas into the pose.
    fn integrate(&mut self, delta_left_in: f64, delta_right_in: f64) {
        let delta_head_rad = (delta_right_in - delta_left_in) / self.track_width_in;
        let delta_centre_in = 0.5 * (delta_left_in + delta_right_in);

        // Length of the chord of the arc travelled by the centre of the robot. For a straight
        // line (no heading change) the chord is the distance itself.
        let chord_in = if delta_head_rad.abs() < 1e-9 {
            delta_centre_in
        } else {
            2.0 * (delta_centre_in / delta_head_rad) * (0.5 * delta_head_rad).sin()
        };

        // The chord points along the mean heading over the arc
        let mid_head_rad = self.pose.heading_rad + 0.5 * delta_head_rad;

        self.pose.position += chord_in * Vector2::new(mid_head_rad.cos(), mid_head_rad.sin());
        self.pose.heading_rad += delta_head_rad;
    }
}

impl OdomSource for WheelOdom {
    fn get_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn update(&mut self) {
        let (left_in, right_in) = self.encoders.distances_in();

        // The first reading only establishes the baseline
        if let Some((prev_left_in, prev_right_in)) = self.prev_dist_in {
            self.integrate(left_in - prev_left_in, right_in - prev_right_in);
        }
        self.prev_dist_in = Some((left_in, right_in));

        trace!("WheelOdom pose: {:?}", self.pose);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::{cell::RefCell, f64::consts::PI, rc::Rc};

    /// Encoders which report whatever the test sets.
    struct TestEncoders(Rc<RefCell<(f64, f64)>>);

    impl Encoders for TestEncoders {
        fn distances_in(&mut self) -> (f64, f64) {
            *self.0.borrow()
        }
    }

    fn build() -> (WheelOdom, Rc<RefCell<(f64, f64)>>) {
        let dists = Rc::new(RefCell::new((100.0, 100.0)));
        let odom = WheelOdom::new(
            Box::new(TestEncoders(dists.clone())),
            10.0,
            Pose::new(0.0, 0.0, 0.0),
        );
        (odom, dists)
    }

    #[test]
    fn test_straight() {
        let (mut odom, dists) = build();

        // Baseline
        odom.update();
        assert_eq!(odom.get_pose(), Pose::new(0.0, 0.0, 0.0));

        *dists.borrow_mut() = (112.0, 112.0);
        odom.update();

        let pose = odom.get_pose();
        assert_relative_eq!(pose.x(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.heading_rad, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_turn() {
        let (mut odom, dists) = build();
        odom.update();

        // Wheels in opposite directions by a quarter of the turning circle
        let quarter = 0.25 * PI * 10.0;
        *dists.borrow_mut() = (100.0 - quarter, 100.0 + quarter);
        odom.update();

        let pose = odom.get_pose();
        assert_relative_eq!(pose.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.heading_rad, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc() {
        let (mut odom, dists) = build();
        odom.update();

        // Quarter circle of radius 20 in to the left in a single update, the arc is integrated
        // exactly so this should land on the end of the arc.
        let radius = 20.0;
        let left = 0.5 * PI * (radius - 5.0);
        let right = 0.5 * PI * (radius + 5.0);
        *dists.borrow_mut() = (100.0 + left, 100.0 + right);
        odom.update();

        let pose = odom.get_pose();
        assert_relative_eq!(pose.x(), radius, epsilon = 1e-9);
        assert_relative_eq!(pose.y(), radius, epsilon = 1e-9);
        assert_relative_eq!(pose.heading_rad, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_set_pose_keeps_baseline() {
        let (mut odom, dists) = build();
        odom.update();

        odom.set_pose(Pose::new(5.0, 5.0, 0.0));
        *dists.borrow_mut() = (101.0, 101.0);
        odom.update();

        assert_relative_eq!(odom.get_pose().x(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(odom.get_pose().y(), 5.0, epsilon = 1e-9);
    }
}
