//! # Sensor interfaces
//!
//! Thin interfaces to the hardware sensors which back the odometry sources. Implementations are
//! expected to absorb read failures themselves, returning their best last-known value, so the
//! autonomy core never sees a sentinel reading.

/// Drive wheel (or tracking wheel) encoders.
pub trait Encoders {
    /// Cumulative distance travelled by the left and right wheels since power on, in inches.
    fn distances_in(&mut self) -> (f64, f64);
}

/// An inertial heading sensor.
pub trait HeadingSensor {
    /// The sensor's heading in radians, anticlockwise positive. The zero is arbitrary.
    fn heading_rad(&mut self) -> f64;
}

/// An absolute positioning sensor.
pub trait PositionSensor {
    /// The latest position fix, or `None` if there's no valid fix this cycle.
    fn position(&mut self) -> Option<super::Pose>;
}
