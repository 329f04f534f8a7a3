//! Trajectory generation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::InterpMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory generator
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrajParams {
    /// Interpolation used between waypoints
    pub mode: InterpMode,

    /// Step of the interpolation parameter along each segment. A segment is split into
    /// `round(1 / step_interval)` samples.
    pub step_interval: f64,
}

impl Default for TrajParams {
    fn default() -> Self {
        Self {
            mode: InterpMode::Spline,
            step_interval: 0.025,
        }
    }
}
