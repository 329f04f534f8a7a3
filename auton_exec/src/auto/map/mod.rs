//! # Map
//!
//! This module implements the [`OccupancyGrid`], a static map of which parts of the field are
//! blocked by obstacles. The grid is loaded once before a match and only read afterwards, it's
//! the input to the [`PathPlanner`](crate::auto::nav::PathPlanner).

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`OccupancyGrid`] type
mod occ_grid;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use occ_grid::{Cell, FieldBounds, MapError, OccupancyGrid};
