use thiserror::Error;

use crate::state::StateId;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most of the hook contract is infallible by design: `acquire` and `release` have no
/// error channel, and `on_close` is best-effort cleanup. What remains fallible is state
/// creation (the host allocating per-state bookkeeping in its open hook) and the typed
/// engine-side surface, which turns handle misuse into a reportable error instead of
/// undefined behavior.
///
/// # Error Categories
///
/// ## Initialization Errors
/// - [`Error::HookInit`] - Host bookkeeping allocation failed in the open hook
///
/// ## Handle Misuse
/// - [`Error::StaleState`] - Id used after its state was closed, or against the wrong table
/// - [`Error::StateLimit`] - No slot available for another interpreter state
///
/// # Examples
///
/// ```rust
/// use interlock::{Error, MutexHooks, StateTable};
/// use std::sync::Arc;
///
/// let table = StateTable::new(Arc::new(MutexHooks::new()));
/// let state = table.open()?;
/// let id = state.id();
/// table.close(state)?;
///
/// match table.acquire(id) {
///     Err(Error::StaleState(stale)) => eprintln!("state {} already closed", stale),
///     other => panic!("expected a stale-state error, got {:?}", other),
/// }
/// # Ok::<(), interlock::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A host hook failed while setting up per-state bookkeeping.
    ///
    /// Raised when [`ConcurrencyHooks::on_open`](crate::ConcurrencyHooks::on_open)
    /// returns an error. This is a fatal initialization failure: the state is never
    /// opened, no handle escapes to the caller, and no further hook is invoked for it.
    ///
    /// # Fields
    ///
    /// * `message` - Description of what the host failed to allocate or initialize
    #[error("Hook initialization failed - {message}")]
    HookInit {
        /// The message describing the host-side initialization failure
        message: String,
    },

    /// A state id referenced a slot that is closed or belongs to another table.
    ///
    /// Produced by the generation check in [`StateTable`](crate::StateTable) when a
    /// copied [`StateId`] outlives its state's close, or when a handle issued by one
    /// table is presented to another. This is the detectable form of what would
    /// otherwise be a use-after-close.
    #[error("Stale or foreign interpreter state - {0}")]
    StaleState(StateId),

    /// The table cannot open any more interpreter states.
    ///
    /// The associated value is the slot capacity that was exhausted.
    #[error("Interpreter state limit reached - {0}")]
    StateLimit(usize),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping
    /// host-side errors with additional context.
    #[error("{0}")]
    Error(String),
}
