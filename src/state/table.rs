use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::{state::StateId, ConcurrencyHooks, Error, Result};

/// Upper bound on slots one table can ever allocate; indices must fit 32 bits.
const SLOT_LIMIT: usize = u32::MAX as usize;

/// Process-wide counter so handles from different tables never validate against
/// each other.
static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// An owned handle to one open interpreter state.
///
/// Returned by [`StateTable::open`] and consumed by [`StateTable::close`]. The handle
/// is deliberately neither `Copy` nor `Clone`: its ownership tracks the open/close
/// lifecycle, so code holding a `StateHandle` can rely on the close hook not having
/// run yet. The `Copy` [`StateId`] obtained from [`id`](StateHandle::id) carries no
/// such guarantee and is re-validated against the slot generation on every call that
/// accepts it.
pub struct StateHandle {
    id: StateId,
    table: u64,
}

impl StateHandle {
    /// Returns the id that hooks receive for this state
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHandle({:?})", self.id)
    }
}

/// One slot in the table. The generation survives the slot's open/close cycles and
/// is what makes ids from earlier cycles detectably stale.
struct Slot {
    generation: u32,
    open: bool,
}

#[derive(Default)]
struct Slots {
    entries: Vec<Slot>,
    free: Vec<u32>,
}

/// The engine-side binding between interpreter states and a host hook set.
///
/// A `StateTable` owns the slot bookkeeping for every interpreter state an engine
/// instance creates, and drives the injected [`ConcurrencyHooks`] at the contractual
/// points: [`on_open`](ConcurrencyHooks::on_open) exactly once before a state's
/// handle escapes [`open`], [`on_close`](ConcurrencyHooks::on_close) exactly once
/// from [`close`], and the acquire/release pair around every exclusive section.
///
/// The hook set is fixed at construction and never swapped mid-flight. Because the
/// binding is an ordinary constructor parameter rather than a process-global,
/// multiple tables with different locking strategies can coexist in one process.
///
/// # Handle Validation
///
/// Every operation that accepts a [`StateId`] checks the slot's generation counter,
/// so using an id after its state's close yields [`Error::StaleState`] instead of
/// silently touching whatever state reuses the slot. Handles are additionally bound
/// to the table that issued them.
///
/// # Examples
///
/// ```rust
/// use interlock::{MutexHooks, StateTable};
/// use std::sync::Arc;
///
/// let table = StateTable::new(Arc::new(MutexHooks::new()));
///
/// let state = table.open()?;
/// {
///     let _guard = table.enter(&state)?;
///     // exclusive access to the state until the guard drops
/// }
/// table.close(state)?;
/// # Ok::<(), interlock::Error>(())
/// ```
///
/// [`open`]: StateTable::open
/// [`close`]: StateTable::close
pub struct StateTable {
    hooks: Arc<dyn ConcurrencyHooks>,
    slots: Mutex<Slots>,
    table_id: u64,
}

impl StateTable {
    /// Creates a table bound to the given hook set.
    ///
    /// The hook set lives as long as the table and is shared by every state the
    /// table opens.
    #[must_use]
    pub fn new(hooks: Arc<dyn ConcurrencyHooks>) -> Self {
        StateTable {
            hooks,
            slots: Mutex::new(Slots::default()),
            table_id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Opens a new interpreter state.
    ///
    /// Allocates a slot and invokes the open hook exactly once, before the returned
    /// handle (and thus the id) is visible to any other thread.
    ///
    /// # Errors
    ///
    /// * [`Error::StateLimit`] - no slot index is available
    /// * Any error from [`ConcurrencyHooks::on_open`] - the fatal initialization
    ///   failure propagates and the slot is reclaimed; no further hook runs for
    ///   the aborted state
    pub fn open(&self) -> Result<StateHandle> {
        let id = self.allocate()?;

        // The slot is marked open before the hook runs, but the id has not escaped
        // this thread yet, which satisfies the open hook's visibility precondition.
        if let Err(err) = self.hooks.on_open(id) {
            self.retire(id);
            return Err(err);
        }

        Ok(StateHandle {
            id,
            table: self.table_id,
        })
    }

    /// Closes an interpreter state, consuming its handle.
    ///
    /// Invokes the close hook exactly once; it is the last hook call ever made for
    /// this state. The caller must guarantee that no thread holds the state or will
    /// attempt to acquire it again - that part of the contract cannot be checked
    /// here.
    ///
    /// # Errors
    ///
    /// * [`Error::StaleState`] - the handle was issued by a different table
    pub fn close(&self, handle: StateHandle) -> Result<()> {
        self.check_handle(&handle)?;

        // Retire the slot before the hook runs so that a racing acquire on a copied
        // id is rejected as stale instead of reaching the host mid-teardown.
        self.retire(handle.id);
        self.hooks.on_close(handle.id);
        Ok(())
    }

    /// Acquires exclusive access to the state, blocking until it is obtainable.
    ///
    /// Validated pass-through to [`ConcurrencyHooks::acquire`] for engines that need
    /// the two halves of the exclusive section as independent calls. Prefer
    /// [`enter`](StateTable::enter), which cannot leak the acquisition.
    ///
    /// # Errors
    ///
    /// * [`Error::StaleState`] - the id does not name a currently open state
    pub fn acquire(&self, id: StateId) -> Result<()> {
        self.check_id(id)?;
        self.hooks.acquire(id);
        Ok(())
    }

    /// Relinquishes exclusive access acquired via [`acquire`](StateTable::acquire).
    ///
    /// Never blocks. Calling it without a matching prior acquire is a contract
    /// violation that only the stale-id case can detect.
    ///
    /// # Errors
    ///
    /// * [`Error::StaleState`] - the id does not name a currently open state
    pub fn release(&self, id: StateId) -> Result<()> {
        self.check_id(id)?;
        self.hooks.release(id);
        Ok(())
    }

    /// Enters the state's exclusive section for the lifetime of the guard.
    ///
    /// The acquire hook has run when this returns; the release hook runs exactly
    /// once when the guard drops, including when the caller unwinds out of the
    /// section with a panic.
    ///
    /// # Errors
    ///
    /// * [`Error::StaleState`] - the handle was issued by a different table
    pub fn enter(&self, handle: &StateHandle) -> Result<StateGuard<'_>> {
        self.check_handle(handle)?;
        self.hooks.acquire(handle.id);
        Ok(StateGuard {
            table: self,
            id: handle.id,
        })
    }

    /// Returns true if `id` names a currently open state of this table
    #[must_use]
    pub fn is_open(&self, id: StateId) -> bool {
        self.check_id(id).is_ok()
    }

    /// Returns the number of currently open states
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.slots.lock().entries.iter().filter(|s| s.open).count()
    }

    fn allocate(&self) -> Result<StateId> {
        let mut slots = self.slots.lock();

        if let Some(index) = slots.free.pop() {
            let slot = &mut slots.entries[index as usize];
            slot.open = true;
            return Ok(StateId::new(index, slot.generation));
        }

        if slots.entries.len() >= SLOT_LIMIT {
            return Err(Error::StateLimit(SLOT_LIMIT));
        }

        let index = slots.entries.len() as u32;
        slots.entries.push(Slot {
            generation: 0,
            open: true,
        });
        Ok(StateId::new(index, 0))
    }

    fn retire(&self, id: StateId) {
        let mut slots = self.slots.lock();
        let slot = &mut slots.entries[id.index() as usize];
        slot.open = false;
        slot.generation = slot.generation.wrapping_add(1);

        // Once a slot has spent its generation space it is never reused, otherwise
        // an id from the first cycle would validate against the wrapped counter.
        if slot.generation != u32::MAX {
            slots.free.push(id.index());
        }
    }

    fn check_id(&self, id: StateId) -> Result<()> {
        let slots = self.slots.lock();
        match slots.entries.get(id.index() as usize) {
            Some(slot) if slot.open && slot.generation == id.generation() => Ok(()),
            _ => Err(Error::StaleState(id)),
        }
    }

    fn check_handle(&self, handle: &StateHandle) -> Result<()> {
        if handle.table != self.table_id {
            return Err(Error::StaleState(handle.id));
        }
        self.check_id(handle.id)
    }
}

impl fmt::Debug for StateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTable")
            .field("table_id", &self.table_id)
            .field("open_count", &self.open_count())
            .finish()
    }
}

/// Exclusive access to one interpreter state for the guard's lifetime.
///
/// Created by [`StateTable::enter`]. Dropping the guard runs the release hook
/// exactly once, which is what keeps the acquire/release projection well nested on
/// error and unwind paths.
pub struct StateGuard<'a> {
    table: &'a StateTable,
    id: StateId,
}

impl StateGuard<'_> {
    /// Returns the id of the state this guard holds
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.table.hooks.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{Event, RecordingHooks};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_open_enter_close_event_order() {
        let hooks = Arc::new(RecordingHooks::new());
        let table = StateTable::new(hooks.clone());

        let state = table.open().unwrap();
        let id = state.id();
        {
            let _guard = table.enter(&state).unwrap();
        }
        table.close(state).unwrap();

        assert_eq!(
            hooks.events(),
            vec![
                Event::Open(id),
                Event::Acquire(id),
                Event::Release(id),
                Event::Close(id),
            ]
        );
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let hooks = Arc::new(RecordingHooks::new());
        let table = StateTable::new(hooks.clone());
        let state = table.open().unwrap();
        let id = state.id();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = table.enter(&state).unwrap();
            panic!("engine unwound out of the exclusive section");
        }));
        assert!(result.is_err());

        table.close(state).unwrap();
        assert_eq!(
            hooks.events(),
            vec![
                Event::Open(id),
                Event::Acquire(id),
                Event::Release(id),
                Event::Close(id),
            ]
        );
    }

    #[test]
    fn test_stale_id_after_close() {
        let table = StateTable::new(Arc::new(RecordingHooks::new()));
        let state = table.open().unwrap();
        let id = state.id();

        assert!(table.is_open(id));
        table.close(state).unwrap();
        assert!(!table.is_open(id));

        assert!(matches!(table.acquire(id), Err(Error::StaleState(_))));
        assert!(matches!(table.release(id), Err(Error::StaleState(_))));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let table = StateTable::new(Arc::new(RecordingHooks::new()));

        let first = table.open().unwrap();
        let first_id = first.id();
        table.close(first).unwrap();

        let second = table.open().unwrap();
        let second_id = second.id();

        assert_eq!(first_id.index(), second_id.index());
        assert_ne!(first_id.generation(), second_id.generation());
        assert!(!table.is_open(first_id));
        assert!(table.is_open(second_id));

        table.close(second).unwrap();
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let table_a = StateTable::new(Arc::new(RecordingHooks::new()));
        let table_b = StateTable::new(Arc::new(RecordingHooks::new()));

        let state_a = table_a.open().unwrap();
        assert!(matches!(
            table_b.enter(&state_a),
            Err(Error::StaleState(_))
        ));
        assert!(matches!(
            table_b.close(state_a),
            Err(Error::StaleState(_))
        ));
    }

    #[test]
    fn test_failed_open_reclaims_slot_and_runs_no_further_hooks() {
        let hooks = Arc::new(RecordingHooks::failing());
        let table = StateTable::new(hooks.clone());

        let err = table.open().unwrap_err();
        assert!(matches!(err, Error::HookInit { .. }));
        assert_eq!(table.open_count(), 0);
        assert!(hooks.events().is_empty());

        // The aborted slot is reusable under a fresh generation.
        hooks.set_fail_open(false);
        let state = table.open().unwrap();
        assert_eq!(state.id().index(), 0);
        assert_eq!(state.id().generation(), 1);
        table.close(state).unwrap();
    }

    #[test]
    fn test_open_count_tracks_lifecycle() {
        let table = StateTable::new(Arc::new(RecordingHooks::new()));
        assert_eq!(table.open_count(), 0);

        let a = table.open().unwrap();
        let b = table.open().unwrap();
        assert_eq!(table.open_count(), 2);

        table.close(a).unwrap();
        assert_eq!(table.open_count(), 1);
        table.close(b).unwrap();
        assert_eq!(table.open_count(), 0);
    }

    #[test]
    fn test_split_acquire_release_pass_through() {
        let hooks = Arc::new(RecordingHooks::new());
        let table = StateTable::new(hooks.clone());
        let state = table.open().unwrap();
        let id = state.id();

        table.acquire(id).unwrap();
        table.release(id).unwrap();
        table.close(state).unwrap();

        assert_eq!(
            hooks.events(),
            vec![
                Event::Open(id),
                Event::Acquire(id),
                Event::Release(id),
                Event::Close(id),
            ]
        );
    }
}
