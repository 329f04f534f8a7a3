//! # Navigation
//!
//! This module provides obstacle aware navigation across the field. The [`PathPlanner`] searches
//! the static [`OccupancyGrid`](crate::auto::map::OccupancyGrid) for a minimum cost route between
//! two poses, and turns that route into a trajectory which can be followed by the pursuit
//! controller.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

mod path_planner;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use path_planner::{CellPath, PathPlanner, PathPlannerParams};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::map::Cell;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("The goal cell {0:?} is occupied")]
    GoalBlocked(Cell),

    #[error("No path exists from {start:?} to {goal:?}")]
    NoPath { start: Cell, goal: Cell },
}
