//! # Sequence list
//!
//! Runs its children one after another. Only the active child is ticked, and when it reports
//! finished the list moves to the next child (resetting it) in the same tick. A looping list
//! wraps back to the first child and never finishes by itself, an optional timeout bounds the
//! run time of either kind.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::{debug, info, warn};

use super::Controller;
use crate::{
    auto::{events::RaisedEvent, loc::Pose},
    chassis::{Chassis, DriveCmd},
};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SeqList {
    children: Vec<Box<dyn Controller>>,

    /// Wrap back to the first child after the last
    looping: bool,

    /// Optional bound on the time since reset
    timeout_ms: Option<u64>,

    clock: Rc<dyn Clock>,

    /// Index of the active child
    index: usize,

    /// Clock time of the last reset
    start_ms: u64,

    /// Set once the last child of a non-looping list has finished
    finished: bool,

    /// Set once the timeout expiry has been logged
    timeout_logged: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SeqList {
    pub fn new(children: Vec<Box<dyn Controller>>, looping: bool, clock: Rc<dyn Clock>) -> Self {
        let mut list = Self {
            children,
            looping,
            timeout_ms: None,
            clock,
            index: 0,
            start_ms: 0,
            finished: false,
            timeout_logged: false,
        };
        list.reset();
        list
    }

    /// Finish the list once the given time has passed since reset.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Index of the child currently being ticked.
    pub fn active_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Tick the list until it finishes, applying each command to the chassis and calling `wait`
    /// between ticks.
    ///
    /// A looping list without a timeout never returns.
    pub fn run_to_completion(&mut self, chassis: &mut dyn Chassis, wait: &mut dyn FnMut()) {
        if self.looping && self.timeout_ms.is_none() {
            warn!("Running a looping list with no timeout to completion, it will never finish");
        }

        while !self.is_finished() {
            if let Some(cmd) = self.update() {
                cmd.apply(chassis);
            }

            if self.is_finished() {
                break;
            }

            wait();
        }

        chassis.stop();
    }

    fn timed_out(&self) -> bool {
        match self.timeout_ms {
            Some(t) => self.clock.now_ms().saturating_sub(self.start_ms) >= t,
            None => false,
        }
    }

    /// Move to the next child after the active one finished.
    fn advance(&mut self) {
        self.index += 1;

        if self.index >= self.children.len() {
            if self.looping {
                self.index = 0;
            } else {
                info!("SeqList completed all {} children", self.children.len());
                self.finished = true;
                return;
            }
        }

        debug!(
            "SeqList moving to child {} ({})",
            self.index,
            self.children[self.index].name()
        );
        self.children[self.index].reset();
    }
}

impl Controller for SeqList {
    fn name(&self) -> &'static str {
        "SeqList"
    }

    fn reset(&mut self) {
        for child in self.children.iter_mut() {
            child.reset();
        }

        self.index = 0;
        self.start_ms = self.clock.now_ms();
        self.finished = self.children.is_empty();
        self.timeout_logged = false;
    }

    fn update(&mut self) -> Option<DriveCmd> {
        if self.timed_out() {
            if !self.timeout_logged {
                warn!("SeqList timed out on child {}", self.index);
                self.timeout_logged = true;
            }
            return Some(DriveCmd::Stop);
        }

        if self.finished {
            return None;
        }

        let child = &mut self.children[self.index];
        let cmd = child.update();

        if child.is_finished() {
            self.advance();
        }

        cmd
    }

    fn is_finished(&self) -> bool {
        self.finished || self.timed_out()
    }

    fn target_pose(&self) -> Option<Pose> {
        self.children.get(self.index).and_then(|c| c.target_pose())
    }

    fn current_events(&self) -> &[RaisedEvent] {
        match self.children.get(self.index) {
            Some(c) => c.current_events(),
            None => &[],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::ctrl::test_util::CountingCtrl;
    use std::cell::RefCell;
    use util::time::ManualClock;

    fn build(
        finish_after: &[usize],
        looping: bool,
    ) -> (SeqList, Rc<RefCell<Vec<usize>>>, Rc<ManualClock>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));

        let children = finish_after
            .iter()
            .enumerate()
            .map(|(id, n)| {
                Box::new(CountingCtrl::new(id, *n, log.clone())) as Box<dyn Controller>
            })
            .collect();

        (SeqList::new(children, looping, clock.clone()), log, clock)
    }

    #[test]
    fn test_finishes_after_children() {
        let (mut list, log, _) = build(&[1, 1, 1], false);

        assert!(!list.is_finished());
        list.update();
        assert_eq!(list.active_index(), 1);
        list.update();
        assert!(!list.is_finished());
        list.update();
        assert!(list.is_finished());

        assert_eq!(*log.borrow(), vec![0, 1, 2]);

        // Nothing is ticked once finished
        assert_eq!(list.update(), None);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_only_active_child_ticked() {
        let (mut list, log, _) = build(&[2, 3], false);

        let cmd = list.update();
        assert_eq!(cmd, Some(DriveCmd::new(0.0, 0.0)));
        for _ in 0..4 {
            list.update();
        }

        assert_eq!(*log.borrow(), vec![0, 0, 1, 1, 1]);
        assert!(list.is_finished());
    }

    #[test]
    fn test_looping() {
        let (mut list, log, _) = build(&[1, 1, 1], true);

        for _ in 0..6 {
            list.update();
            assert!(!list.is_finished());
        }

        assert_eq!(*log.borrow(), vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_timeout() {
        let (list, log, clock) = build(&[100], true);
        let mut list = list.with_timeout(1000);

        list.update();
        clock.advance(999);
        assert!(!list.is_finished());

        clock.advance(1);
        assert!(list.is_finished());
        assert_eq!(list.update(), Some(DriveCmd::Stop));
        assert_eq!(log.borrow().len(), 1);

        // Reset restarts the timeout
        list.reset();
        assert!(!list.is_finished());
    }

    #[test]
    fn test_empty_list() {
        let clock = Rc::new(ManualClock::new(0));
        let mut list = SeqList::new(Vec::new(), false, clock);

        assert!(list.is_finished());
        assert_eq!(list.update(), None);
    }

    /// Children which finish after the given numbers of updates, with handles on their reset counts.
    fn counting_children(
        finish_after: &[usize],
        log: &Rc<RefCell<Vec<usize>>>,
    ) -> (Vec<Box<dyn Controller>>, Vec<Rc<RefCell<usize>>>) {
        finish_after
            .iter()
            .enumerate()
            .map(|(id, n)| {
                let child = CountingCtrl::new(id, *n, log.clone());
                let resets = child.resets.clone();
                (Box::new(child) as Box<dyn Controller>, resets)
            })
            .unzip()
    }

    fn reset_counts(resets: &[Rc<RefCell<usize>>]) -> Vec<usize> {
        resets.iter().map(|r| *r.borrow()).collect()
    }

    #[test]
    fn test_reset_restarts_children() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));
        let (children, resets) = counting_children(&[1, 1, 3], &log);
        let mut list = SeqList::new(children, false, clock);

        // Every child is reset once on construction
        assert_eq!(reset_counts(&resets), vec![1, 1, 1]);

        list.update();
        list.update();
        list.update();
        assert_eq!(list.active_index(), 2);
        // Children are reset again when they become active
        let before = reset_counts(&resets);
        assert_eq!(before, vec![1, 2, 2]);

        list.reset();

        let after = reset_counts(&resets);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(*a, b + 1);
        }
        assert_eq!(list.active_index(), 0);
        assert!(!list.is_finished());

        // The first child is ticked again and needs its full update count
        log.borrow_mut().clear();
        list.update();
        assert_eq!(*log.borrow(), vec![0]);
        assert_eq!(list.active_index(), 1);
    }

    #[test]
    fn test_reset_after_finishing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let clock = Rc::new(ManualClock::new(0));
        let (children, resets) = counting_children(&[1, 1], &log);
        let mut list = SeqList::new(children, false, clock);

        list.update();
        list.update();
        assert!(list.is_finished());
        assert_eq!(list.update(), None);

        list.reset();

        assert_eq!(reset_counts(&resets), vec![2, 3]);
        assert_eq!(list.active_index(), 0);
        assert!(!list.is_finished());
        assert_eq!(list.update(), Some(DriveCmd::new(0.0, 0.0)));
    }

    #[derive(Default)]
    struct CountingChassis {
        drives: usize,
        stops: usize,
    }

    impl Chassis for CountingChassis {
        fn drive(&mut self, _forward: f64, _turn: f64, _strafe: f64) {
            self.drives += 1;
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn set_speed(&mut self, _speed: f64) {}
    }

    #[test]
    fn test_run_to_completion() {
        let (mut list, _, clock) = build(&[2, 1], false);
        let mut chassis = CountingChassis::default();
        let mut waits = 0;

        list.run_to_completion(&mut chassis, &mut || {
            waits += 1;
            clock.advance(20);
        });

        assert!(list.is_finished());
        assert_eq!(chassis.drives, 3);
        assert_eq!(chassis.stops, 1);
        assert_eq!(waits, 2);
    }
}
