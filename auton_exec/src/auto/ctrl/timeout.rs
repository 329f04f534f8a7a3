//! # Timeout
//!
//! Bounds the run time of another controller. Once the timeout has passed the wrapped controller
//! is no longer ticked, the chassis is stopped and the timeout reports finished whatever the
//! state of its child.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::warn;

use super::Controller;
use crate::{
    auto::{events::RaisedEvent, loc::Pose},
    chassis::DriveCmd,
};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Timeout {
    child: Box<dyn Controller>,

    timeout_ms: u64,

    clock: Rc<dyn Clock>,

    /// Clock time of the last reset
    start_ms: u64,

    expiry_logged: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Timeout {
    pub fn new(child: Box<dyn Controller>, timeout_ms: u64, clock: Rc<dyn Clock>) -> Self {
        let start_ms = clock.now_ms();
        Self {
            child,
            timeout_ms,
            clock,
            start_ms,
            expiry_logged: false,
        }
    }

    pub fn expired(&self) -> bool {
        self.clock.now_ms().saturating_sub(self.start_ms) >= self.timeout_ms
    }
}

impl Controller for Timeout {
    fn name(&self) -> &'static str {
        "Timeout"
    }

    fn reset(&mut self) {
        self.child.reset();
        self.start_ms = self.clock.now_ms();
        self.expiry_logged = false;
    }

    fn update(&mut self) -> Option<DriveCmd> {
        if self.expired() {
            if !self.expiry_logged {
                warn!(
                    "{} timed out after {} ms",
                    self.child.name(),
                    self.timeout_ms
                );
                self.expiry_logged = true;
            }
            return Some(DriveCmd::Stop);
        }

        self.child.update()
    }

    fn is_finished(&self) -> bool {
        self.expired() || self.child.is_finished()
    }

    fn target_pose(&self) -> Option<Pose> {
        self.child.target_pose()
    }

    fn current_events(&self) -> &[RaisedEvent] {
        if self.expired() {
            &[]
        } else {
            self.child.current_events()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::ctrl::{test_util::CountingCtrl, SeqList};
    use std::cell::RefCell;
    use util::time::ManualClock;

    #[test]
    fn test_timeout_expires() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));
        let mut timeout = Timeout::new(
            Box::new(CountingCtrl::new(3, 1000, log.clone())),
            100,
            clock.clone(),
        );

        assert!(timeout.update().is_some());
        assert!(!timeout.is_finished());

        clock.advance(100);
        assert!(timeout.is_finished());
        assert_eq!(timeout.update(), Some(DriveCmd::Stop));

        // Child was only ticked before expiry
        assert_eq!(*log.borrow(), vec![3]);

        timeout.reset();
        assert!(!timeout.is_finished());
    }

    #[test]
    fn test_reset_restarts_wrapped_list() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));

        let first = CountingCtrl::new(0, 2, log.clone());
        let second = CountingCtrl::new(1, 1000, log.clone());
        let resets = vec![first.resets.clone(), second.resets.clone()];
        let children: Vec<Box<dyn Controller>> = vec![Box::new(first), Box::new(second)];
        let list = SeqList::new(children, false, clock.clone());
        let mut timeout = Timeout::new(Box::new(list), 100, clock.clone());

        for _ in 0..4 {
            timeout.update();
            clock.advance(20);
        }
        assert_eq!(*log.borrow(), vec![0, 0, 1, 1]);

        clock.advance(40);
        assert!(timeout.is_finished());
        assert_eq!(timeout.update(), Some(DriveCmd::Stop));
        assert_eq!(log.borrow().len(), 4);

        let before: Vec<usize> = resets.iter().map(|r| *r.borrow()).collect();
        timeout.reset();
        let after: Vec<usize> = resets.iter().map(|r| *r.borrow()).collect();

        assert_eq!(after, vec![before[0] + 1, before[1] + 1]);
        assert!(!timeout.is_finished());

        // The list starts over from its first child
        log.borrow_mut().clear();
        assert_eq!(timeout.update(), Some(DriveCmd::new(0.0, 0.0)));
        assert_eq!(*log.borrow(), vec![0]);

        // And the timeout runs from the reset
        clock.advance(99);
        assert!(!timeout.is_finished());
        clock.advance(1);
        assert!(timeout.is_finished());
    }

    #[test]
    fn test_child_finishes_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));
        let mut timeout = Timeout::new(Box::new(CountingCtrl::new(0, 1, log)), 100, clock);

        timeout.update();
        assert!(timeout.is_finished());
        assert!(!timeout.expired());
    }
}
