use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{lock_api::RawReentrantMutex, RawMutex, RawThreadId};

use crate::{state::StateId, ConcurrencyHooks, Result};

/// Raw reentrant mutex with split lock/unlock, owner tracked by thread id.
type RawLock = RawReentrantMutex<RawMutex, RawThreadId>;

/// Reentrant-lock hooks for embeddings whose engine re-enters states on one thread.
///
/// Same shape as [`MutexHooks`](crate::MutexHooks), but the per-state lock tracks
/// its owning thread: a thread that already holds a state may call
/// [`acquire`](ConcurrencyHooks::acquire) for it again without deadlocking, and
/// exclusive access is relinquished only when the outermost
/// [`release`](ConcurrencyHooks::release) runs. Other threads observe mutual
/// exclusion exactly as with the non-reentrant implementation.
///
/// Each nested `acquire` must still be matched by exactly one `release`; the
/// adapter relaxes the deadlock hazard, not the pairing rule.
#[derive(Default)]
pub struct ReentrantHooks {
    locks: DashMap<StateId, Arc<RawLock>>,
}

impl ReentrantHooks {
    /// Creates a hook set with no per-state bookkeeping yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of states currently holding bookkeeping
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.locks.len()
    }

    fn lock_for(&self, state: StateId) -> Option<Arc<RawLock>> {
        // Clone the Arc out of the map so the shard lock is not held while the
        // caller blocks on the state lock.
        self.locks.get(&state).map(|entry| Arc::clone(entry.value()))
    }
}

impl ConcurrencyHooks for ReentrantHooks {
    fn on_open(&self, state: StateId) -> Result<()> {
        let previous = self.locks.insert(state, Arc::new(RawLock::INIT));
        debug_assert!(previous.is_none(), "open hook ran twice for {}", state);
        Ok(())
    }

    fn acquire(&self, state: StateId) {
        let Some(lock) = self.lock_for(state) else {
            debug_assert!(false, "acquire for a state that is not open: {}", state);
            return;
        };

        lock.lock();
    }

    fn release(&self, state: StateId) {
        let Some(lock) = self.lock_for(state) else {
            debug_assert!(false, "release for a state that is not open: {}", state);
            return;
        };

        // SAFETY: the engine pairs this call with a prior acquire by the same
        // thread, which therefore owns the lock at some nesting depth.
        unsafe { lock.unlock() };
    }

    fn on_close(&self, state: StateId) {
        let removed = self.locks.remove(&state);
        debug_assert!(removed.is_some(), "close hook for unknown state {}", state);
    }
}
