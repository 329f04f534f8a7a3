//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::Cell;

use crate::session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic source of milliseconds, used by timed actions and timeouts.
pub trait Clock {
    /// Milliseconds elapsed since the clock's start.
    fn now_ms(&self) -> u64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock measuring time since the session epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionClock;

/// A clock which only moves when told to.
///
/// Used by the simulation and in tests, where time must advance in lock step
/// with the control cycle.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Clock for SessionClock {
    fn now_ms(&self) -> u64 {
        (session::get_elapsed_seconds() * 1000.0) as u64
    }
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Move the clock forward by the given number of milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);

        clock.advance(20);
        assert_eq!(clock.now_ms(), 120);

        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }

    #[test]
    fn test_session_clock_monotonic() {
        let clock = SessionClock;

        let mut last = clock.now_ms();
        for _ in 0..100 {
            let now = clock.now_ms();
            assert!(now >= last);
            last = now;
        }
    }
}
