//! # Autonomy Module
//!
//! This module provides the autonomous motion of the robot: authored paths are turned into
//! trajectories, trajectories are followed against the robot's pose estimate, and the events
//! attached to the path are raised as the robot reaches them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Controller tree - composable building blocks of autonomous routines
pub mod ctrl;

/// Event dispatch - fires mechanism handlers as events are reached
pub mod events;

/// Localisation module - provides the robot with an idea of where it is on the field
pub mod loc;

/// Map module - provides the static occupancy grid of the field
pub mod map;

/// Navigation module - provides path planning around obstacles
pub mod nav;

/// Defines path types
pub mod path;

/// Trajectory generation - samples paths into dense trajectories
pub mod traj;

/// Trajectory control module - keeps the robot on the given trajectory
pub mod traj_ctrl;
