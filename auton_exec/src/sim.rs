//! # Simulated robot
//!
//! A simple kinematic model of a differential drive robot with an optional strafe axis, used to
//! run routines without hardware. The model implements [`Chassis`] and provides simulated
//! sensors for the odometry sources.
//!
//! The sensors share the robot's state, so they read whatever the robot has done up to the last
//! [`SimRobot::step`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use log::trace;
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    auto::loc::{
        sensors::{Encoders, HeadingSensor, PositionSensor},
        Pose,
    },
    chassis::{clamp_unit, Chassis},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated robot
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimParams {
    /// Speed at full forward (and strafe) demand.
    ///
    /// Units: inches/second
    pub max_speed_ips: f64,

    /// Turn rate at full turn demand.
    ///
    /// Units: radians/second
    pub max_turn_rate_rads: f64,

    /// Distance between the wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Raw reading of the inertial sensor when the robot faces +X
    pub imu_zero_rad: f64,

    /// If non-zero, every n-th read of the position sensor has no fix
    pub position_dropout_every: usize,
}

/// Shared state of the simulated robot.
#[derive(Debug, Clone)]
struct SimState {
    /// True pose of the robot
    pose: Pose,

    /// Cumulative wheel distances
    left_in: f64,
    right_in: f64,

    /// Current demands
    forward: f64,
    turn: f64,
    strafe: f64,

    /// Overall speed scale
    speed: f64,

    /// Number of reads of the position sensor
    position_reads: usize,
}

/// The simulated robot.
pub struct SimRobot {
    params: SimParams,
    state: Rc<RefCell<SimState>>,
}

/// Simulated wheel encoders
pub struct SimEncoders(Rc<RefCell<SimState>>);

/// Simulated inertial sensor
pub struct SimImu {
    state: Rc<RefCell<SimState>>,
    zero_rad: f64,
}

/// Simulated absolute position sensor
pub struct SimPositionSensor {
    state: Rc<RefCell<SimState>>,
    dropout_every: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_speed_ips: 60.0,
            max_turn_rate_rads: 6.0,
            track_width_in: 12.0,
            imu_zero_rad: 0.3,
            position_dropout_every: 0,
        }
    }
}

impl SimRobot {
    pub fn new(params: SimParams, start_pose: Pose) -> Self {
        Self {
            params,
            state: Rc::new(RefCell::new(SimState {
                pose: start_pose,
                left_in: 0.0,
                right_in: 0.0,
                forward: 0.0,
                turn: 0.0,
                strafe: 0.0,
                speed: 1.0,
                position_reads: 0,
            })),
        }
    }

    /// The true pose of the robot.
    pub fn pose(&self) -> Pose {
        self.state.borrow().pose
    }

    pub fn speed(&self) -> f64 {
        self.state.borrow().speed
    }

    pub fn encoders(&self) -> SimEncoders {
        SimEncoders(self.state.clone())
    }

    pub fn imu(&self) -> SimImu {
        SimImu {
            state: self.state.clone(),
            zero_rad: self.params.imu_zero_rad,
        }
    }

    pub fn position_sensor(&self) -> SimPositionSensor {
        SimPositionSensor {
            state: self.state.clone(),
            dropout_every: self.params.position_dropout_every,
        }
    }

    /// Advance the model by the given time with the current demands.
    pub fn step(&mut self, dt_s: f64) {
        let mut s = self.state.borrow_mut();

        let v = s.forward * s.speed * self.params.max_speed_ips;
        let vs = s.strafe * s.speed * self.params.max_speed_ips;
        let w = s.turn * s.speed * self.params.max_turn_rate_rads;

        // Wheels only see the differential motion
        let half_track = 0.5 * self.params.track_width_in;
        s.left_in += (v - w * half_track) * dt_s;
        s.right_in += (v + w * half_track) * dt_s;

        // Constant velocities trace an arc, the displacement is its chord which lies along the
        // mean heading.
        let half_turn = 0.5 * w * dt_s;
        let chord_scale = if half_turn.abs() < 1e-12 {
            1.0
        } else {
            half_turn.sin() / half_turn
        };

        let (sin, cos) = (s.pose.heading_rad + half_turn).sin_cos();
        s.pose.position +=
            Vector2::new(v * cos - vs * sin, v * sin + vs * cos) * dt_s * chord_scale;
        s.pose.heading_rad += w * dt_s;

        trace!("Sim pose: {:?}", s.pose);
    }
}

impl Chassis for SimRobot {
    fn drive(&mut self, forward: f64, turn: f64, strafe: f64) {
        let mut s = self.state.borrow_mut();
        s.forward = clamp_unit(forward);
        s.turn = clamp_unit(turn);
        s.strafe = clamp_unit(strafe);
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.forward = 0.0;
        s.turn = 0.0;
        s.strafe = 0.0;
    }

    fn set_speed(&mut self, speed: f64) {
        self.state.borrow_mut().speed = speed.max(0.0).min(1.0);
    }
}

impl Encoders for SimEncoders {
    fn distances_in(&mut self) -> (f64, f64) {
        let s = self.0.borrow();
        (s.left_in, s.right_in)
    }
}

impl HeadingSensor for SimImu {
    fn heading_rad(&mut self) -> f64 {
        self.state.borrow().pose.heading_rad + self.zero_rad
    }
}

impl PositionSensor for SimPositionSensor {
    fn position(&mut self) -> Option<Pose> {
        let mut s = self.state.borrow_mut();
        s.position_reads += 1;

        if self.dropout_every > 0 && s.position_reads % self.dropout_every == 0 {
            None
        } else {
            Some(s.pose)
        }
    }
}
