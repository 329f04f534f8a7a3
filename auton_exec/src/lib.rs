//! # Autonomy library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the autonomy crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy - trajectories, controllers, localisation and navigation
pub mod auto;

/// Chassis interface - the boundary between the autonomy and the drive hardware
pub mod chassis;

/// Exec parameters
pub mod params;

/// Simulated robot - a kinematic model standing in for the hardware
pub mod sim;
