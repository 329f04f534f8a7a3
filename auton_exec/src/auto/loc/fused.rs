//! # Fused odometry
//!
//! Weighted complementary fusion of several odometry sources. On each update all inputs are
//! updated and read, the weighted estimate is computed, and that estimate is written back into
//! every input so they don't drift apart.
//!
//! Positions are combined as a plain weighted mean. Headings are combined as a weighted circular
//! mean, so that sources either side of the +/-pi seam don't average to the opposite direction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;

use super::{OdomError, OdomSource, Pose, SharedOdom};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the sum of the weights
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct FusedOdom {
    /// The input sources and their weights
    sources: Vec<(SharedOdom, f64)>,

    /// Last fused estimate
    pose: Pose,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FusedOdom {
    /// Create a new fused source.
    ///
    /// Every weight must lie in [0, 1] and the weights must sum to 1.
    pub fn new(sources: Vec<(SharedOdom, f64)>) -> Result<Self, OdomError> {
        if sources.is_empty() {
            return Err(OdomError::NoSources);
        }

        for (index, (_, weight)) in sources.iter().enumerate() {
            if !(0.0..=1.0).contains(weight) {
                return Err(OdomError::InvalidWeight {
                    index,
                    weight: *weight,
                });
            }
        }

        let sum: f64 = sources.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(OdomError::WeightSum(sum));
        }

        let mut fused = Self {
            sources,
            pose: Pose::default(),
        };
        fused.pose = fused.combine();

        Ok(fused)
    }

    /// Compute the weighted estimate from the current poses of the inputs.
    fn combine(&self) -> Pose {
        let mut position = Vector2::zeros();
        let mut sin_sum = 0.0;
        let mut cos_sum = 0.0;

        for (source, weight) in self.sources.iter() {
            let pose = source.borrow().get_pose();
            position += pose.position * *weight;
            sin_sum += weight * pose.heading_rad.sin();
            cos_sum += weight * pose.heading_rad.cos();
        }

        Pose {
            position,
            heading_rad: sin_sum.atan2(cos_sum),
        }
    }

    /// Write the given pose into all inputs.
    fn write_back(&self, pose: Pose) {
        for (source, _) in self.sources.iter() {
            source.borrow_mut().set_pose(pose);
        }
    }
}

impl OdomSource for FusedOdom {
    fn get_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.write_back(pose);
        self.pose = pose;
    }

    fn update(&mut self) {
        for (source, _) in self.sources.iter() {
            source.borrow_mut().update();
        }

        self.pose = self.combine();
        self.write_back(self.pose);

        trace!("FusedOdom pose: {:?}", self.pose);
    }
}
