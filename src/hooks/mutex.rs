use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{lock_api::RawMutex as _, Mutex};

use crate::{state::StateId, ConcurrencyHooks, Result};

/// Mutex-backed hooks for multi-threaded embeddings.
///
/// Allocates one mutex per open state in [`on_open`](ConcurrencyHooks::on_open) and
/// frees it in [`on_close`](ConcurrencyHooks::on_close). The lock is driven through
/// the raw mutex API rather than an RAII guard, because `acquire` and `release`
/// arrive as two independent calls from the engine, possibly at different depths of
/// its call stack, and no guard lifetime can span that boundary.
///
/// # Deadlock Hazard
///
/// This implementation is non-reentrant. A thread that calls
/// [`acquire`](ConcurrencyHooks::acquire) for a state it already holds blocks on
/// itself and hangs indefinitely; the contract defines no detection or recovery for
/// this. Embeddings whose engine-internal call paths can re-enter the same state on
/// one thread must use [`ReentrantHooks`](crate::ReentrantHooks) instead, or
/// guarantee single-entry call patterns.
///
/// # Examples
///
/// ```rust
/// use interlock::{MutexHooks, StateTable};
/// use std::sync::Arc;
///
/// let table = StateTable::new(Arc::new(MutexHooks::new()));
/// let state = table.open()?;
/// {
///     let _guard = table.enter(&state)?;
///     // the calling thread is the sole holder of the state here
/// }
/// table.close(state)?;
/// # Ok::<(), interlock::Error>(())
/// ```
#[derive(Default)]
pub struct MutexHooks {
    /// One lock per open state, keyed by the full id so a reused slot index under a
    /// new generation never collides with a closing predecessor.
    locks: DashMap<StateId, Arc<Mutex<()>>>,
}

impl MutexHooks {
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

    fn lock_for(&self, state: StateId) -> Option<Arc<Mutex<()>>> {
        // Clone the Arc out of the map so the shard lock is not held while the
        // caller blocks on the state mutex.
        self.locks.get(&state).map(|entry| Arc::clone(entry.value()))
    }
}

impl ConcurrencyHooks for MutexHooks {
    fn on_open(&self, state: StateId) -> Result<()> {
        let previous = self.locks.insert(state, Arc::new(Mutex::new(())));
        debug_assert!(previous.is_none(), "open hook ran twice for {}", state);
        Ok(())
    }

    fn acquire(&self, state: StateId) {
        let Some(lock) = self.lock_for(state) else {
            debug_assert!(false, "acquire for a state that is not open: {}", state);
            return;
        };

        // SAFETY: the raw mutex is only ever driven through this acquire/release
        // pair, which the engine calls in matched order.
        unsafe { lock.raw() }.lock();
    }

    fn release(&self, state: StateId) {
        let Some(lock) = self.lock_for(state) else {
            debug_assert!(false, "release for a state that is not open: {}", state);
            return;
        };

        // SAFETY: the engine pairs this call with a prior acquire on the same
        // state, so the mutex is locked and owned by this hook set.
        unsafe { lock.force_unlock() };
    }

    fn on_close(&self, state: StateId) {
        let removed = self.locks.remove(&state);
        debug_assert!(removed.is_some(), "close hook for unknown state {}", state);
    }
}
