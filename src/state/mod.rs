//! Typed interpreter-state identity and the engine-side binding table.
//!
//! The hook contract in [`hooks`](crate::hooks) treats interpreter states as opaque.
//! This module supplies the identity those opaque references are made of, plus the
//! bookkeeping an engine needs to drive the hooks correctly:
//!
//! - [`StateId`] - a `Copy` identifier packing a slot index and a generation counter,
//!   which is what hook implementations receive and may key bookkeeping maps by
//! - [`StateHandle`] - a non-copyable owned handle whose lifetime spans exactly one
//!   open/close cycle of a state
//! - [`StateTable`] - the table that allocates slots, validates ids against slot
//!   generations, and invokes the injected hook set at the contractual points
//! - [`StateGuard`] - an RAII exclusive section, releasing on drop so unwind paths
//!   stay balanced

mod id;
mod table;

pub use id::StateId;
pub use table::{StateGuard, StateHandle, StateTable};
