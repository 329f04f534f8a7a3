//! Plans minimum cost paths through an [`OccupancyGrid`], using an A* algorithm.
//!
//! The search runs over the 8-connected grid with a cost of 10 for a straight step and 14 for a
//! diagonal one, so costs stay integer. The heuristic is the octile distance with the same costs,
//! which never overestimates, so the first time the goal is taken off the open list the path to
//! it is optimal. Diagonal steps are allowed between two occupied cells.
//!
//! Nodes are kept in an arena and refer to their parents by index. The open list is a binary heap
//! ordered by lowest `f` first, ties going to the node discovered first, and stale heap entries
//! are skipped as they come off rather than being removed when a cheaper route to a cell is found.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cmp::Reverse, collections::BinaryHeap, rc::Rc};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::auto::{
    loc::Pose,
    map::{Cell, OccupancyGrid},
    path::{Path, Waypoint},
    traj::{GeneratedTrajectory, InterpMode, TrajGenerator, TrajParams},
};

use super::NavError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Cost of a step along an axis
const STRAIGHT_COST: u32 = 10;

/// Cost of a diagonal step
const DIAGONAL_COST: u32 = 14;

/// Offsets of the 8 neighbours of a cell
const NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PathPlanner {
    params: PathPlannerParams,

    grid: Rc<OccupancyGrid>,

    generator: TrajGenerator,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathPlannerParams {
    /// Interpolation step of the trajectory generated from the planned cells
    pub step_interval: f64,

    /// Drop cells which lie on a straight line between their neighbours before generating the
    /// trajectory
    pub simplify: bool,
}

/// The raw result of a grid search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellPath {
    /// Cells from the start to the goal, inclusive
    pub cells: Vec<Cell>,

    /// Total cost of the path in step costs
    pub cost: u32,
}

/// An A* node
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,

    /// Cost of the best known route from the start
    g: u32,

    /// Arena index of the parent, `None` for the start
    parent: Option<usize>,
}

/// An entry in the open list.
///
/// Field order matters, the derived ordering compares `f` first then the discovery order. Both
/// are reversed so the max-heap pops the cheapest, earliest entry.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: Reverse<u32>,
    seq: Reverse<usize>,
    node: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PathPlannerParams {
    fn default() -> Self {
        Self {
            step_interval: TrajParams::default().step_interval,
            simplify: true,
        }
    }
}

impl PathPlanner {
    pub fn new(grid: Rc<OccupancyGrid>, params: PathPlannerParams) -> Self {
        let generator = TrajGenerator::new(TrajParams {
            mode: InterpMode::Linear,
            step_interval: params.step_interval,
        });

        Self {
            params,
            grid,
            generator,
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Plan a trajectory between the two poses.
    ///
    /// The trajectory starts exactly at the start pose and ends exactly at the goal pose, the
    /// points in between are the centres of the planned cells.
    pub fn find_path(&self, start: &Pose, goal: &Pose) -> Result<GeneratedTrajectory, NavError> {
        let cell_path = self.find_cell_path(start, goal)?;

        let cells = if self.params.simplify {
            simplify(&cell_path.cells)
        } else {
            cell_path.cells.clone()
        };

        // The path always has distinct start and end waypoints, even when both poses are in the
        // same cell.
        let mut waypoints = Vec::with_capacity(cells.len().max(2));
        waypoints.push(Waypoint::new(
            start.x(),
            start.y(),
            start.heading_rad.to_degrees(),
        ));
        if cells.len() > 2 {
            for cell in cells[1..cells.len() - 1].iter() {
                let pos = self.grid.position_of(*cell);
                waypoints.push(Waypoint::new(pos[0], pos[1], 0.0));
            }
        }
        waypoints.push(Waypoint::new(
            goal.x(),
            goal.y(),
            goal.heading_rad.to_degrees(),
        ));

        debug!(
            "Planned path of {} cells (cost {}) reduced to {} waypoints",
            cell_path.cells.len(),
            cell_path.cost,
            waypoints.len()
        );

        Ok(self.generator.generate(&Path::new(waypoints)))
    }

    /// Find the minimum cost sequence of cells between the cells containing the two poses.
    pub fn find_cell_path(&self, start: &Pose, goal: &Pose) -> Result<CellPath, NavError> {
        let start_cell = self.grid.cell_of(&start.position);
        let goal_cell = self.grid.cell_of(&goal.position);

        self.search(start_cell, goal_cell)
    }

    /// A* search between two cells.
    ///
    /// The start cell may be occupied (the robot may be reported inside an obstacle by a noisy
    /// pose), the goal cell may not.
    pub fn search(&self, start: Cell, goal: Cell) -> Result<CellPath, NavError> {
        if self.grid.is_occupied(goal) {
            return Err(NavError::GoalBlocked(goal));
        }

        let num_cells = self.grid.width() * self.grid.height();
        let index_of = |cell: Cell| cell.y * self.grid.width() + cell.x;

        let mut arena: Vec<Node> = Vec::new();
        let mut open = BinaryHeap::new();
        let mut best_g: Vec<Option<u32>> = vec![None; num_cells];
        let mut closed = vec![false; num_cells];
        let mut seq = 0;

        arena.push(Node {
            cell: start,
            g: 0,
            parent: None,
        });
        best_g[index_of(start)] = Some(0);
        open.push(OpenEntry {
            f: Reverse(octile(start, goal)),
            seq: Reverse(seq),
            node: 0,
        });

        while let Some(entry) = open.pop() {
            let node = arena[entry.node];
            let flat = index_of(node.cell);

            // Stale entry, the cell was already expanded through a cheaper route
            if closed[flat] {
                continue;
            }
            closed[flat] = true;

            if node.cell == goal {
                trace!("A* expanded {} nodes", arena.len());
                return Ok(CellPath {
                    cells: walk_back(&arena, entry.node),
                    cost: node.g,
                });
            }

            for (dx, dy) in NEIGHBOURS.iter() {
                let next = match self
                    .grid
                    .cell_at(node.cell.x as i64 + dx, node.cell.y as i64 + dy)
                {
                    Some(c) => c,
                    None => continue,
                };

                if self.grid.is_occupied(next) || closed[index_of(next)] {
                    continue;
                }

                let step = if *dx != 0 && *dy != 0 {
                    DIAGONAL_COST
                } else {
                    STRAIGHT_COST
                };
                let g = node.g + step;

                let next_flat = index_of(next);
                if best_g[next_flat].map_or(false, |best| best <= g) {
                    continue;
                }
                best_g[next_flat] = Some(g);

                arena.push(Node {
                    cell: next,
                    g,
                    parent: Some(entry.node),
                });
                seq += 1;
                open.push(OpenEntry {
                    f: Reverse(g + octile(next, goal)),
                    seq: Reverse(seq),
                    node: arena.len() - 1,
                });
            }
        }

        Err(NavError::NoPath { start, goal })
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Octile distance between two cells in step costs.
fn octile(a: Cell, b: Cell) -> u32 {
    let dx = (a.x as i64 - b.x as i64).abs() as u32;
    let dy = (a.y as i64 - b.y as i64).abs() as u32;

    STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
}

/// Follow the parent chain from the given node back to the start, returning the cells in
/// start-to-goal order.
fn walk_back(arena: &[Node], mut index: usize) -> Vec<Cell> {
    let mut cells = vec![arena[index].cell];

    while let Some(parent) = arena[index].parent {
        cells.push(arena[parent].cell);
        index = parent;
    }

    cells.reverse();
    cells
}

/// Remove cells which lie in the middle of a straight run.
fn simplify(cells: &[Cell]) -> Vec<Cell> {
    if cells.len() <= 2 {
        return cells.to_vec();
    }

    let step = |a: Cell, b: Cell| (b.x as i64 - a.x as i64, b.y as i64 - a.y as i64);

    let mut simplified = vec![cells[0]];
    for w in cells.windows(3) {
        if step(w[0], w[1]) != step(w[1], w[2]) {
            simplified.push(w[1]);
        }
    }
    simplified.push(cells[cells.len() - 1]);

    simplified
}
