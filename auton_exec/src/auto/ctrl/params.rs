//! Point-to-point controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::auto::traj_ctrl::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the direct controller
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DirectParams {
    /// Gains of the loop from the forward offset of the target (inches) to forward demand
    pub forward_gains: PidGains,

    /// Gains of the loop from the bearing error (radians) to turn demand
    pub turn_gains: PidGains,

    /// Distance from the target within which the controller is finished.
    ///
    /// Units: inches
    pub position_tolerance_in: f64,
}

/// Parameters for the find controller
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FindParams {
    /// Distance the requested target must move from the last planned target before a new path
    /// is planned.
    ///
    /// Units: inches
    pub replan_threshold_in: f64,

    /// Time to wait after a failed plan before planning again.
    ///
    /// Units: milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for DirectParams {
    fn default() -> Self {
        Self {
            forward_gains: PidGains::p(0.05),
            turn_gains: PidGains::p(1.0),
            position_tolerance_in: 2.0,
        }
    }
}

impl Default for FindParams {
    fn default() -> Self {
        Self {
            replan_threshold_in: 12.0,
            retry_backoff_ms: 500,
        }
    }
}
