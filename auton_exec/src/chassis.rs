//! # Chassis interface
//!
//! The boundary between the autonomy core and the drive hardware. Controllers never drive the
//! chassis themselves, they return a [`DriveCmd`] which the host applies.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A drivable chassis.
pub trait Chassis {
    /// Drive with the given normalised demands, each in [-1, 1].
    ///
    /// `forward` is positive forwards, `turn` is positive anticlockwise and `strafe` is positive
    /// to the left. Non-holonomic chassis ignore `strafe`.
    fn drive(&mut self, forward: f64, turn: f64, strafe: f64);

    /// Stop all drive motors.
    fn stop(&mut self);

    /// Set the overall speed scale, in [0, 1].
    fn set_speed(&mut self, speed: f64);
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// A drive command issued by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DriveCmd {
    /// Drive with the given demands
    Move { forward: f64, turn: f64, strafe: f64 },

    /// Stop the chassis
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {
    /// A non-holonomic move with no strafe.
    pub fn new(forward: f64, turn: f64) -> Self {
        DriveCmd::Move {
            forward,
            turn,
            strafe: 0.0,
        }
    }

    /// The command as seen in a field frame mirrored in a single axis, where anticlockwise
    /// becomes clockwise and left becomes right.
    pub fn mirrored(&self) -> Self {
        match *self {
            DriveCmd::Move {
                forward,
                turn,
                strafe,
            } => DriveCmd::Move {
                forward,
                turn: -turn,
                strafe: -strafe,
            },
            DriveCmd::Stop => DriveCmd::Stop,
        }
    }

    /// Apply the command to the chassis, clamping the demands into range.
    pub fn apply(&self, chassis: &mut dyn Chassis) {
        match *self {
            DriveCmd::Move {
                forward,
                turn,
                strafe,
            } => chassis.drive(clamp_unit(forward), clamp_unit(turn), clamp_unit(strafe)),
            DriveCmd::Stop => chassis.stop(),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a demand into [-1, 1], with NaN treated as no demand.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(-1.0).min(1.0)
    }
}
