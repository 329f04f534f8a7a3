//! # Localisation module
//!
//! This module provides the robot's idea of where it is on the field. A [`Pose`] estimate is
//! produced by one of a number of [`OdomSource`]s:
//!
//! - [`WheelOdom`] - integration of the drive wheel encoders
//! - [`AbsoluteOdom`] - an absolute positioning sensor (GPS-like)
//! - [`InertialOdom`] - heading from an inertial sensor
//! - [`FusedOdom`] - weighted complementary fusion of other sources
//! - [`MirrorOdom`] - axis-mirrored view of another source, for the opposite side of the field
//! - [`OnSetOdom`] - the pose is whatever was last set
//!
//! Sources compose by wrapping [`SharedOdom`] handles to one another, so no source owns the
//! lifetime of another. Calling [`OdomSource::update`] on the outermost source propagates the
//! update down the chain.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod absolute;
mod fused;
mod inertial;
mod mirror;
mod params;
pub mod sensors;
mod wheel;

pub use absolute::AbsoluteOdom;
pub use fused::FusedOdom;
pub use inertial::InertialOdom;
pub use mirror::MirrorOdom;
pub use params::OdomParams;
pub use wheel::WheelOdom;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    cell::RefCell,
    ops::{Add, Mul, Sub},
    rc::Rc,
};

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position and heading of the robot on the field.
///
/// Positions are in inches, the heading is in radians anticlockwise from the field +X axis.
///
/// The heading is never normalised automatically, neither on construction nor by arithmetic.
/// Use [`Pose::with_normalized_heading`] before comparing angles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position on the field
    pub position: Vector2<f64>,

    /// Heading anticlockwise from the +X axis
    pub heading_rad: f64,
}

/// A pose source which reports whatever pose was last set on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnSetOdom {
    pose: Pose,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of pose estimates.
pub trait OdomSource {
    /// Get the current best estimate of the pose.
    fn get_pose(&self) -> Pose;

    /// Overwrite the current pose estimate.
    fn set_pose(&mut self, pose: Pose);

    /// Poll any sensors backing this source and update the estimate.
    ///
    /// Wrapping sources update the sources they wrap.
    fn update(&mut self) {}
}

/// A handle to an odometry source shared between its writers and readers.
pub type SharedOdom = Rc<RefCell<dyn OdomSource>>;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors that can occur while building odometry sources.
#[derive(Debug, thiserror::Error)]
pub enum OdomError {
    #[error("A fused source must have at least one input source")]
    NoSources,

    #[error("Weight {weight} of source {index} is outside of [0, 1]")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("Fusion weights must sum to 1, found {0}")]
    WeightSum(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, heading_rad: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading_rad,
        }
    }

    /// Build a pose with the heading given in degrees.
    pub fn from_deg(x: f64, y: f64, heading_deg: f64) -> Self {
        Self::new(x, y, heading_deg.to_radians())
    }

    pub fn x(&self) -> f64 {
        self.position[0]
    }

    pub fn y(&self) -> f64 {
        self.position[1]
    }

    /// Euclidean distance between the positions of the two poses.
    pub fn distance(&self, other: &Pose) -> f64 {
        (other.position - self.position).norm()
    }

    /// Distance of the position from the field origin.
    pub fn magnitude(&self) -> f64 {
        self.position.norm()
    }

    /// Returns a pose with the position scaled to unit length, keeping the heading.
    ///
    /// A pose at the origin is returned unchanged.
    pub fn normalized(&self) -> Pose {
        let mag = self.magnitude();
        if mag <= std::f64::EPSILON {
            *self
        } else {
            Pose {
                position: self.position / mag,
                heading_rad: self.heading_rad,
            }
        }
    }

    /// Returns this pose with the heading wrapped into (-pi, pi].
    pub fn with_normalized_heading(&self) -> Pose {
        Pose {
            position: self.position,
            heading_rad: wrap_pi(self.heading_rad),
        }
    }

    /// Unit vector pointing along the heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Bearing (field frame angle) from this pose's position to the given point.
    pub fn bearing_to(&self, point: &Vector2<f64>) -> f64 {
        let delta = point - self.position;
        delta[1].atan2(delta[0])
    }

    /// Express a field-frame point in the robot's local frame, with +X forward and +Y to the
    /// left.
    pub fn to_local(&self, point: &Vector2<f64>) -> Vector2<f64> {
        Rotation2::new(-self.heading_rad) * (point - self.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Pose) -> Pose {
        Pose {
            position: self.position + rhs.position,
            heading_rad: self.heading_rad + rhs.heading_rad,
        }
    }
}

impl Sub for Pose {
    type Output = Pose;

    fn sub(self, rhs: Pose) -> Pose {
        Pose {
            position: self.position - rhs.position,
            heading_rad: self.heading_rad - rhs.heading_rad,
        }
    }
}

impl Mul<f64> for Pose {
    type Output = Pose;

    fn mul(self, rhs: f64) -> Pose {
        Pose {
            position: self.position * rhs,
            heading_rad: self.heading_rad * rhs,
        }
    }
}

impl OnSetOdom {
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl OdomSource for OnSetOdom {
    fn get_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap the given source in a shared handle.
pub fn shared<O: OdomSource + 'static>(source: O) -> Rc<RefCell<O>> {
    Rc::new(RefCell::new(source))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_arithmetic() {
        let a = Pose::new(1.0, 2.0, 0.5);
        let b = Pose::new(3.0, -1.0, 4.0);

        assert_eq!(a + b, Pose::new(4.0, 1.0, 4.5));
        assert_eq!(b - a, Pose::new(2.0, -3.0, 3.5));
        assert_eq!(a * 2.0, Pose::new(2.0, 4.0, 1.0));

        // Heading isn't normalised by arithmetic
        assert_relative_eq!((b + b).heading_rad, 8.0);
        assert_relative_eq!((b + b).with_normalized_heading().heading_rad, 8.0 - 2.0 * PI);
    }

    #[test]
    fn test_pose_geometry() {
        let a = Pose::new(0.0, 0.0, 0.0);
        let b = Pose::new(3.0, 4.0, 1.0);

        assert_relative_eq!(a.distance(&b), 5.0);
        assert_relative_eq!(b.magnitude(), 5.0);
        assert_relative_eq!(b.normalized().magnitude(), 1.0);
        assert_relative_eq!(b.normalized().heading_rad, 1.0);
        assert_eq!(a.normalized(), a);
    }

    #[test]
    fn test_to_local() {
        // Robot facing +Y, a point further along +Y is straight ahead
        let pose = Pose::new(1.0, 1.0, PI / 2.0);
        let local = pose.to_local(&Vector2::new(1.0, 5.0));
        assert_relative_eq!(local[0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(local[1], 0.0, epsilon = 1e-9);

        // A point along -X is to the robot's left
        let local = pose.to_local(&Vector2::new(-1.0, 1.0));
        assert_relative_eq!(local[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(local[1], 2.0, epsilon = 1e-9);

        assert_relative_eq!(pose.bearing_to(&Vector2::new(2.0, 2.0)), PI / 4.0);
    }
}
