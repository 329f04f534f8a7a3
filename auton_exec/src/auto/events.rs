//! # Event dispatch
//!
//! Passes the events raised by the routine to the mechanism handlers registered by the host.
//! Controllers expose their current events every cycle for as long as the triggering waypoint is
//! reached, so the dispatcher fires an event on the rising edge of its presence only. An event
//! which reappears shortly after firing is also suppressed by a debounce time, which stops an
//! event flickering on and off at the edge of the trigger radius from firing many times.
//!
//! Each raised event is latched separately by the waypoint that raised it together with its name
//! and parameters. `intake on` and `intake off` are independent, and the same event authored on
//! two waypoints is two triggers which both fire, even when the waypoints' trigger radii overlap.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use serde::Deserialize;

use super::path::Event;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A mechanism callback, given the parameters of the event.
pub type EventHandler = Box<dyn FnMut(&str)>;

/// Parameters for the event dispatcher
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EventParams {
    /// Time after an event fires during which it won't fire again.
    ///
    /// Units: milliseconds
    pub debounce_ms: u64,
}

/// An event raised by a controller, tagged with the index of the waypoint which raised it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RaisedEvent {
    /// Index of the waypoint in its trajectory
    pub waypoint: usize,

    pub event: Event,
}

/// Debounced rising edge latch for a single event.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTimer {
    /// Whether the event was present on the last poll
    present: bool,

    /// Time the event last fired
    last_fired_ms: Option<u64>,
}

/// Dispatches events to their registered handlers.
pub struct EventDispatcher {
    params: EventParams,

    handlers: HashMap<String, Vec<EventHandler>>,

    timers: HashMap<RaisedEvent, EventTimer>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for EventParams {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

impl RaisedEvent {
    pub fn new(waypoint: usize, event: Event) -> Self {
        Self { waypoint, event }
    }
}

impl EventTimer {
    /// Update the latch with whether the event is present, returning true if it should fire.
    pub fn poll(&mut self, present: bool, now_ms: u64, debounce_ms: u64) -> bool {
        let rising = present && !self.present;
        self.present = present;

        if !rising {
            return false;
        }

        match self.last_fired_ms {
            Some(t) if now_ms.saturating_sub(t) < debounce_ms => false,
            _ => {
                self.last_fired_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl EventDispatcher {
    pub fn new(params: EventParams) -> Self {
        Self {
            params,
            handlers: HashMap::new(),
            timers: HashMap::new(),
        }
    }

    /// Register a handler for all events with the given name. Many handlers may be registered
    /// for one name, they're called in the order they were registered.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.handlers
            .entry(name.to_string())
            .or_insert_with(Vec::new)
            .push(Box::new(handler));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Process the events currently present, firing the handlers of those which have just
    /// appeared. Returns the number of events fired.
    pub fn dispatch(&mut self, events: &[RaisedEvent], now_ms: u64) -> usize {
        let present: HashSet<&RaisedEvent> = events.iter().collect();

        // Events which have gone away can fire again when they come back
        for (event, timer) in self.timers.iter_mut() {
            if !present.contains(event) {
                timer.poll(false, now_ms, self.params.debounce_ms);
            }
        }

        let mut fired = 0;
        let mut polled = HashSet::new();

        // Events fire in the order they're given, duplicates are only considered once
        for raised in events.iter() {
            if !polled.insert(raised) {
                continue;
            }

            let timer = self.timers.entry(raised.clone()).or_default();

            if !timer.poll(true, now_ms, self.params.debounce_ms) {
                continue;
            }

            let event = &raised.event;
            match self.handlers.get_mut(&event.name) {
                Some(handlers) => {
                    trace!("Firing event {} {}", event.name, event.params);
                    for handler in handlers.iter_mut() {
                        handler(&event.params);
                    }
                    fired += 1;
                }
                None => debug!("No handler registered for event \"{}\"", event.name),
            }
        }

        fired
    }

    /// Forget the state of all events, so any present on the next dispatch fire immediately.
    pub fn reset(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn raised(waypoint: usize, name: &str, params: &str) -> RaisedEvent {
        RaisedEvent::new(waypoint, Event::new(name, params))
    }

    fn dispatcher() -> (EventDispatcher, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new(EventParams { debounce_ms: 100 });

        let c = calls.clone();
        dispatcher.register("intake", move |p| c.borrow_mut().push(format!("intake {}", p)));

        (dispatcher, calls)
    }

    #[test]
    fn test_one_shot() {
        let (mut d, calls) = dispatcher();
        let events = [raised(0, "intake", "on")];

        assert_eq!(d.dispatch(&events, 0), 1);
        assert_eq!(d.dispatch(&events, 20), 0);
        assert_eq!(d.dispatch(&events, 500), 0);

        assert_eq!(*calls.borrow(), vec!["intake on".to_string()]);
    }

    #[test]
    fn test_debounce() {
        let (mut d, calls) = dispatcher();
        let events = [raised(0, "intake", "on")];

        d.dispatch(&events, 0);
        d.dispatch(&[], 20);

        // Back within the debounce time
        assert_eq!(d.dispatch(&events, 40), 0);
        d.dispatch(&[], 60);

        // Back after the debounce time
        assert_eq!(d.dispatch(&events, 200), 1);

        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_params_distinguish_events() {
        let (mut d, calls) = dispatcher();

        d.dispatch(&[raised(0, "intake", "on")], 0);
        d.dispatch(&[raised(0, "intake", "off")], 20);

        assert_eq!(
            *calls.borrow(),
            vec!["intake on".to_string(), "intake off".to_string()]
        );
    }

    #[test]
    fn test_unregistered_and_reset() {
        let (mut d, calls) = dispatcher();
        let events = [raised(0, "clamp", "close"), raised(0, "intake", "on")];

        // Only the registered event counts as fired
        assert_eq!(d.dispatch(&events, 0), 1);
        assert!(!d.is_registered("clamp"));

        d.reset();
        assert_eq!(d.dispatch(&events, 10), 1);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_multiple_handlers() {
        let (mut d, calls) = dispatcher();
        let count = Rc::new(RefCell::new(0));

        let c = count.clone();
        d.register("intake", move |_| *c.borrow_mut() += 1);

        d.dispatch(&[raised(0, "intake", "on")], 0);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_same_event_on_two_waypoints() {
        let (mut d, calls) = dispatcher();

        // Overlapping trigger radii, the event never leaves the present set
        assert_eq!(d.dispatch(&[raised(1, "intake", "toggle")], 0), 1);
        assert_eq!(d.dispatch(&[raised(1, "intake", "toggle")], 20), 0);
        assert_eq!(d.dispatch(&[raised(2, "intake", "toggle")], 40), 1);
        assert_eq!(d.dispatch(&[raised(2, "intake", "toggle")], 60), 0);

        // A later waypoint within the debounce time of the last is still its own trigger
        d.dispatch(&[], 80);
        assert_eq!(d.dispatch(&[raised(3, "intake", "toggle")], 90), 1);

        assert_eq!(calls.borrow().len(), 3);
    }
}
