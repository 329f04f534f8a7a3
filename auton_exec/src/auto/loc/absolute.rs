//! # Absolute odometry
//!
//! Pose from an absolute positioning sensor. When the sensor has no valid fix the last good pose
//! is held.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{sensors::PositionSensor, OdomSource, Pose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct AbsoluteOdom {
    sensor: Box<dyn PositionSensor>,

    pose: Pose,

    /// Set while the sensor isn't giving a fix, so that loss is only logged once
    fix_lost: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AbsoluteOdom {
    pub fn new(sensor: Box<dyn PositionSensor>, start_pose: Pose) -> Self {
        Self {
            sensor,
            pose: start_pose,
            fix_lost: false,
        }
    }
}

impl OdomSource for AbsoluteOdom {
    fn get_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn update(&mut self) {
        match self.sensor.position() {
            Some(pose) => {
                if self.fix_lost {
                    debug!("Absolute position fix regained");
                    self.fix_lost = false;
                }
                self.pose = pose;
            }
            None => {
                if !self.fix_lost {
                    debug!("Absolute position fix lost, holding {:?}", self.pose);
                    self.fix_lost = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct ScriptedSensor(Vec<Option<Pose>>);

    impl PositionSensor for ScriptedSensor {
        fn position(&mut self) -> Option<Pose> {
            if self.0.is_empty() {
                None
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn test_holds_last_fix() {
        let fixes = vec![Some(Pose::new(1.0, 2.0, 0.5)), None, Some(Pose::new(3.0, 4.0, 0.0))];
        let mut odom = AbsoluteOdom::new(Box::new(ScriptedSensor(fixes)), Pose::default());

        odom.update();
        assert_eq!(odom.get_pose(), Pose::new(1.0, 2.0, 0.5));

        odom.update();
        assert_eq!(odom.get_pose(), Pose::new(1.0, 2.0, 0.5));

        odom.update();
        assert_eq!(odom.get_pose(), Pose::new(3.0, 4.0, 0.0));
    }
}
