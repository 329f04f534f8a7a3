//! # Timed action
//!
//! Drives a fixed command for a fixed time from reset. Used for simple open loop moves such as
//! backing off a scoring position.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use super::Controller;
use crate::chassis::DriveCmd;
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TimedAction {
    forward: f64,
    turn: f64,
    strafe: f64,

    duration_ms: u64,

    clock: Rc<dyn Clock>,

    /// Clock time of the last reset
    start_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedAction {
    pub fn new(
        forward: f64,
        turn: f64,
        strafe: f64,
        duration_ms: u64,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let start_ms = clock.now_ms();
        Self {
            forward,
            turn,
            strafe,
            duration_ms,
            clock,
            start_ms,
        }
    }
}

impl Controller for TimedAction {
    fn name(&self) -> &'static str {
        "TimedAction"
    }

    fn reset(&mut self) {
        self.start_ms = self.clock.now_ms();
    }

    fn update(&mut self) -> Option<DriveCmd> {
        if self.is_finished() {
            Some(DriveCmd::Stop)
        } else {
            Some(DriveCmd::Move {
                forward: self.forward,
                turn: self.turn,
                strafe: self.strafe,
            })
        }
    }

    fn is_finished(&self) -> bool {
        self.clock.now_ms().saturating_sub(self.start_ms) >= self.duration_ms
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::time::ManualClock;

    #[test]
    fn test_timed_action() {
        let clock = Rc::new(ManualClock::new(500));
        let mut action = TimedAction::new(-0.5, 0.0, 0.0, 300, clock.clone());

        clock.advance(100);
        action.reset();

        assert_eq!(action.update(), Some(DriveCmd::new(-0.5, 0.0)));
        clock.advance(299);
        assert!(!action.is_finished());

        clock.advance(1);
        assert!(action.is_finished());
        assert_eq!(action.update(), Some(DriveCmd::Stop));
    }
}
