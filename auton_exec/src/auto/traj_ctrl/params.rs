//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pursuit controller
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PursuitParams {
    /// Target distance from the robot to the chosen lookahead sample.
    ///
    /// Units: inches
    pub lookahead_in: f64,

    /// Number of samples searched for the lookahead point each cycle, starting from and including
    /// the current one.
    pub sample_window: usize,

    /// Number of waypoints checked for arrival each cycle, starting from and including the current
    /// one.
    pub waypoint_window: usize,

    /// Distance within which a waypoint counts as reached and its events fire.
    ///
    /// Units: inches
    pub event_radius_in: f64,

    /// Proportional gain from forward offset (inches) to forward demand
    pub k_forward: f64,

    /// Proportional gain from heading error (radians) to turn demand
    pub k_turn: f64,

    /// Scale applied to both demands after clamping
    pub safety_scale: f64,

    /// Distance from the final sample at which a non-looping pursuit is finished.
    ///
    /// Units: inches
    pub finish_tolerance_in: f64,

    /// Restart the trajectory from the beginning when the end is reached
    pub looping: bool,
}

impl Default for PursuitParams {
    fn default() -> Self {
        Self {
            lookahead_in: 24.0,
            sample_window: 20,
            waypoint_window: 2,
            event_radius_in: 12.0,
            k_forward: 0.1,
            k_turn: 1.5,
            safety_scale: 0.5,
            finish_tolerance_in: 4.0,
            looping: false,
        }
    }
}
