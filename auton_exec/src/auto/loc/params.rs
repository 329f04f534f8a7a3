//! Odometry parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for building the odometry sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OdomParams {
    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Fusion weight of the wheel odometry
    pub wheel_weight: f64,

    /// Fusion weight of the absolute position sensor
    pub absolute_weight: f64,

    /// Fusion weight of the inertial heading source
    pub inertial_weight: f64,

    /// Mirror the field in X, used when starting from the opposite side
    pub mirror_x: bool,

    /// Mirror the field in Y
    pub mirror_y: bool,
}

impl Default for OdomParams {
    fn default() -> Self {
        Self {
            track_width_in: 12.0,
            wheel_weight: 0.6,
            absolute_weight: 0.2,
            inertial_weight: 0.2,
            mirror_x: false,
            mirror_y: false,
        }
    }
}
