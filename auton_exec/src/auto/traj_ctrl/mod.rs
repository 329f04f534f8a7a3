//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on a generated trajectory. The
//! trajectory is a dense list of samples, and the [`PursuitCtrl`] chases a sample a fixed
//! lookahead distance ahead of the robot. Steering at a point ahead, rather than at the nearest
//! point, smooths out the response to small pose errors.
//!
//! As the robot passes the authored waypoints of the trajectory their events are raised, which
//! is how mechanism actions are synchronised with the motion.
//!
//! The [`PidController`] feedback loop used by the point-to-point controllers also lives here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod pursuit;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::PursuitParams;
pub use pursuit::PursuitCtrl;
