//! Shared test doubles used by unit tests across the crate.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::{ConcurrencyHooks, Error, Result, StateId};

/// One observed hook invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Open(StateId),
    Acquire(StateId),
    Release(StateId),
    Close(StateId),
}

/// Hook double that records every invocation in order.
///
/// Provides no mutual exclusion of its own; it exists to assert call sequences.
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<Event>>,
    fail_open: AtomicBool,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// A double whose open hook reports a fatal initialization failure.
    pub fn failing() -> Self {
        let hooks = Self::default();
        hooks.fail_open.store(true, Ordering::Relaxed);
        hooks
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::Relaxed);
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl ConcurrencyHooks for RecordingHooks {
    fn on_open(&self, state: StateId) -> Result<()> {
        if self.fail_open.load(Ordering::Relaxed) {
            return Err(Error::HookInit {
                message: format!("bookkeeping allocation refused for {}", state),
            });
        }
        self.events.lock().push(Event::Open(state));
        Ok(())
    }

    fn acquire(&self, state: StateId) {
        self.events.lock().push(Event::Acquire(state));
    }

    fn release(&self, state: StateId) {
        self.events.lock().push(Event::Release(state));
    }

    fn on_close(&self, state: StateId) {
        self.events.lock().push(Event::Close(state));
    }
}
