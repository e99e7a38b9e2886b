//! The concurrency hook contract between an interpreter engine and its host.
//!
//! An embeddable interpreter engine calls out to its host at four fixed points in its
//! control flow: before any operation that reads or mutates a shared interpreter state
//! ([`ConcurrencyHooks::acquire`]), after the operation completes, including on unwind
//! paths ([`ConcurrencyHooks::release`]), when a state is brought into existence
//! ([`ConcurrencyHooks::on_open`]) and when it is permanently destroyed
//! ([`ConcurrencyHooks::on_close`]). The hook set is passive and reactive; control flow
//! is entirely driven by the engine.
//!
//! The contract is injected into the engine-side [`StateTable`](crate::StateTable) as a
//! trait object at construction time, so multiple independent engine instances with
//! different locking strategies can coexist in one process.
//!
//! # Shipped Implementations
//!
//! - [`NoopHooks`] - the identity implementation for single-threaded embeddings
//! - [`MutexHooks`] - one non-reentrant mutex per open state
//! - [`ReentrantHooks`] - one reentrant mutex per open state, allowing nested
//!   acquisition from the same thread
//!
//! # Ordering Guarantees
//!
//! For a fixed state `S`, a conforming engine guarantees:
//!
//! - `on_open(S)` runs exactly once, before the first `acquire(S)` and before `S` is
//!   visible to any other thread
//! - every `acquire(S)` is followed by exactly one matching `release(S)`
//! - `on_close(S)` runs exactly once, after the last `release(S)`, and is the last
//!   hook call ever made for `S`
//!
//! A conforming host guarantees in return that between `acquire(S)` and the matching
//! `release(S)` the calling thread is the sole holder of `S`. The sequence of holders
//! is totally ordered; which waiting thread is granted access next is unspecified.

mod mutex;
mod reentrant;

pub use mutex::MutexHooks;
pub use reentrant::ReentrantHooks;

use crate::{state::StateId, Result};

/// Host-supplied thread-synchronization and lifecycle hooks for interpreter states.
///
/// Implement this trait to inject a locking strategy into an interpreter engine
/// without modifying the engine's sources. All four operations have default no-op
/// bodies, so the minimal conforming implementation for a single-threaded embedding
/// is an empty `impl` block (see [`NoopHooks`]).
///
/// Implementations must be [`Send`] + [`Sync`]: the engine invokes hooks from every
/// thread that enters it, through a shared reference.
///
/// # Reentrancy
///
/// Whether the same thread may call [`acquire`](Self::acquire) twice for one state
/// without an intervening [`release`](Self::release) is implementation-defined. The
/// baseline contract is non-reentrant: nested acquisition deadlocks unless the
/// implementation is explicitly reentrant (see [`ReentrantHooks`]). There is no
/// cancellation or timeout channel; an implementation wanting bounded waits must
/// build the timeout into `acquire` and decide itself how to surface expiry.
///
/// # Examples
///
/// A host that only wants visibility into engine activity can count hook calls:
///
/// ```rust
/// use interlock::{ConcurrencyHooks, StateId, StateTable};
/// use std::sync::{
///     atomic::{AtomicUsize, Ordering},
///     Arc,
/// };
///
/// #[derive(Default)]
/// struct CountingHooks {
///     entries: AtomicUsize,
/// }
///
/// impl ConcurrencyHooks for CountingHooks {
///     fn acquire(&self, _state: StateId) {
///         self.entries.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let hooks = Arc::new(CountingHooks::default());
/// let table = StateTable::new(hooks.clone());
///
/// let state = table.open()?;
/// {
///     let _guard = table.enter(&state)?;
/// }
/// table.close(state)?;
///
/// assert_eq!(hooks.entries.load(Ordering::Relaxed), 1);
/// # Ok::<(), interlock::Error>(())
/// ```
pub trait ConcurrencyHooks: Send + Sync {
    /// Called exactly once when `state` is brought into existence.
    ///
    /// Runs before `state` is visible to any other thread and before the first
    /// [`acquire`](Self::acquire) for it. This is where per-state bookkeeping
    /// (such as a mutex instance) is allocated.
    ///
    /// # Errors
    ///
    /// Returning an error is a fatal initialization failure: the engine aborts
    /// creation of the state and never invokes another hook for it.
    fn on_open(&self, state: StateId) -> Result<()> {
        let _ = state;
        Ok(())
    }

    /// Blocks until the calling thread holds exclusive access to `state`.
    ///
    /// The engine invokes this before any operation that reads or mutates the state
    /// and pairs it with exactly one later [`release`](Self::release) on the same
    /// logical execution. Implementations must guarantee at most one holder at a
    /// time; an implementation that cannot is a contract violation, not a
    /// recoverable error. Fairness among waiters is unspecified.
    ///
    /// Calling this for a state that was never opened, or after its close, is a
    /// programming error in the engine.
    fn acquire(&self, state: StateId) {
        let _ = state;
    }

    /// Relinquishes exclusive access to `state`.
    ///
    /// Never blocks. After it returns, another waiter (if any) may proceed.
    /// Calling this without a matching prior [`acquire`](Self::acquire) is a
    /// programming error; the contract defines no way to detect or report it here.
    fn release(&self, state: StateId) {
        let _ = state;
    }

    /// Called exactly once when `state` is permanently destroyed.
    ///
    /// Runs after the last [`release`](Self::release); no thread holds or will ever
    /// again acquire `state`. Per-state bookkeeping is freed here. Cleanup is
    /// best-effort: there is no error channel, and implementations must not panic.
    fn on_close(&self, state: StateId) {
        let _ = state;
    }
}

/// The identity implementation for single-threaded embeddings.
///
/// All four hooks do nothing. This is a valid implementation of the contract, but
/// correct only when the embedding guarantees that no interpreter state is ever
/// entered from two threads concurrently.
///
/// # Examples
///
/// ```rust
/// use interlock::{NoopHooks, StateTable};
/// use std::sync::Arc;
///
/// let table = StateTable::new(Arc::new(NoopHooks));
/// let state = table.open()?;
/// let _guard = table.enter(&state)?;
/// # Ok::<(), interlock::Error>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ConcurrencyHooks for NoopHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateId;

    #[test]
    fn test_noop_hooks_are_callable_in_any_order() {
        // No bookkeeping, so even an out-of-contract sequence is inert.
        let hooks = NoopHooks;
        let id = StateId::new(0, 0);

        assert!(hooks.on_open(id).is_ok());
        hooks.acquire(id);
        hooks.release(id);
        hooks.on_close(id);
    }

    #[test]
    fn test_default_trait_bodies_are_noops() {
        struct Bare;
        impl ConcurrencyHooks for Bare {}

        let hooks = Bare;
        let id = StateId::new(3, 1);
        assert!(hooks.on_open(id).is_ok());
        hooks.acquire(id);
        hooks.release(id);
        hooks.on_close(id);
    }

    #[test]
    fn test_hooks_are_object_safe() {
        let hooks: Box<dyn ConcurrencyHooks> = Box::new(NoopHooks);
        let id = StateId::new(1, 0);
        hooks.acquire(id);
        hooks.release(id);
    }
}
