//! # PID controller
//!
//! The feedback loop used by the point-to-point controllers. Time is passed in by the caller so
//! the loop runs off the same clock as the rest of the routine.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a PID loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    gains: PidGains,

    /// Time the previous error was passed in, in seconds
    prev_time_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidGains {
    /// Proportional only gains
    pub fn p(k_p: f64) -> Self {
        Self {
            k_p,
            ..Default::default()
        }
    }
}

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            prev_time_s: None,
            prev_error: None,
            integral: 0.0,
        }
    }

    /// Forget the integral and derivative history.
    pub fn reset(&mut self) {
        self.prev_time_s = None;
        self.prev_error = None;
        self.integral = 0.0;
    }

    /// Get the output of the controller for the given error at the given time.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // No time difference on the first call, or if the clock hasn't moved. In that case
        // neither the integral nor the derivative can be computed, so they're left out rather
        // than spiking.
        let dt = match self.prev_time_s {
            Some(t0) if time_s > t0 => Some(time_s - t0),
            _ => None,
        };

        if let Some(dt) = dt {
            self.integral += error * dt;
        }

        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(dt)) => (error - e) / dt,
            _ => 0.0,
        };

        self.prev_error = Some(error);
        self.prev_time_s = Some(time_s);

        self.gains.k_p * error + self.gains.k_i * self.integral + self.gains.k_d * deriv
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_p_only() {
        let mut pid = PidController::new(PidGains::p(2.0));
        assert_relative_eq!(pid.get(1.5, 0.0), 3.0);
        assert_relative_eq!(pid.get(-1.0, 0.02), -2.0);
    }

    #[test]
    fn test_integral_and_derivative() {
        let mut pid = PidController::new(PidGains {
            k_p: 0.0,
            k_i: 1.0,
            k_d: 1.0,
        });

        // First call has no history
        assert_relative_eq!(pid.get(1.0, 0.0), 0.0);

        // Integral 2 * 0.5, derivative (2 - 1) / 0.5
        assert_relative_eq!(pid.get(2.0, 0.5), 1.0 + 2.0);

        pid.reset();
        assert_relative_eq!(pid.get(2.0, 1.0), 0.0);
    }
}
