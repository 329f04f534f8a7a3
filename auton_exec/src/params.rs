//! # Autonomy Executable Parameters
//!
//! This module provides the parameters for the autonomy executable. A single TOML file holds the
//! exec's own settings at the top level and a table for each module, any of which may be omitted
//! to use the module's defaults.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    auto::{
        ctrl::{DirectParams, FindParams},
        events::EventParams,
        loc::OdomParams,
        map::FieldBounds,
        nav::PathPlannerParams,
        traj::TrajParams,
        traj_ctrl::PursuitParams,
    },
    sim::SimParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AutonExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// The run is stopped after this time even if the routine hasn't finished.
    ///
    /// Units: seconds
    pub run_time_limit_s: f64,

    /// Sleep for the remainder of each cycle. When false the simulation runs as fast as it can,
    /// with simulated time still advancing by one cycle period per cycle.
    pub real_time: bool,

    /// Path file followed at the start of the routine, relative to the software root
    pub path_file: String,

    /// Occupancy grid file used by the planner, relative to the software root
    pub map_file: String,

    /// Area of the field covered by the occupancy grid
    pub field_bounds: FieldBounds,

    /// Target of the find stage of the routine, (x in, y in, heading deg)
    pub find_target: (f64, f64, f64),

    /// Time allowed for the find stage.
    ///
    /// Units: milliseconds
    pub find_timeout_ms: u64,

    /// Duration and forward demand of the back-off after the path
    pub back_off_ms: u64,
    pub back_off_forward: f64,

    pub traj: TrajParams,
    pub pursuit: PursuitParams,
    pub direct: DirectParams,
    pub find: FindParams,
    pub planner: PathPlannerParams,
    pub events: EventParams,
    pub odom: OdomParams,
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AutonExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            run_time_limit_s: 30.0,
            real_time: false,
            path_file: "paths/demo.path".into(),
            map_file: "maps/field.map".into(),
            field_bounds: FieldBounds::default(),
            find_target: (120.0, 120.0, 90.0),
            find_timeout_ms: 8000,
            back_off_ms: 400,
            back_off_forward: -0.4,
            traj: TrajParams::default(),
            pursuit: PursuitParams::default(),
            direct: DirectParams::default(),
            find: FindParams::default(),
            planner: PathPlannerParams::default(),
            events: EventParams::default(),
            odom: OdomParams::default(),
            sim: SimParams::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params() {
        let params: AutonExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.01
            find_target = [10.0, 20.0, 0.0]

            [pursuit]
            lookahead_in = 18.0

            [odom]
            mirror_x = true
            "#,
        )
        .unwrap();

        assert_eq!(params.cycle_period_s, 0.01);
        assert_eq!(params.find_target, (10.0, 20.0, 0.0));
        assert_eq!(params.pursuit.lookahead_in, 18.0);
        assert_eq!(params.pursuit.sample_window, 20);
        assert!(params.odom.mirror_x);
        assert_eq!(params.run_time_limit_s, 30.0);
    }
}
