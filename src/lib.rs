// Copyright 2025 The interlock developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # interlock
//!
//! [![Crates.io](https://img.shields.io/crates/v/interlock.svg)](https://crates.io/crates/interlock)
//! [![Documentation](https://docs.rs/interlock/badge.svg)](https://docs.rs/interlock)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/interlock-rs/interlock/blob/main/LICENSE)
//!
//! A typed concurrency and lifecycle hook contract for embedding scripting interpreter
//! engines in multi-threaded hosts. `interlock` lets a host application inject
//! thread-synchronization behavior into an embeddable interpreter without modifying the
//! interpreter's own sources: the engine calls out at four fixed points - acquire
//! exclusive access to an interpreter state, release it, and be notified when a state
//! is opened or closed - and the host decides what those calls mean.
//!
//! ## Features
//!
//! - **🔌 Dependency-injected binding** - The hook set is a trait object handed to the
//!   engine at construction time, not a link-time symbol; engines with different
//!   locking strategies coexist in one process
//! - **🛡️ Detectable misuse** - Interpreter states are strongly-typed handles backed
//!   by a generation-counted slot table, so use-after-close is a reported error, not
//!   undefined behavior
//! - **🔒 Shipped locking strategies** - No-op for single-threaded embeddings, a
//!   per-state mutex for multi-threaded ones, and a reentrant adapter for engines
//!   that re-enter states on one thread
//! - **↩️ Unwind safety** - The RAII exclusive section keeps acquire/release pairing
//!   well nested even when the engine panics out of a critical section
//!
//! ## Quick Start
//!
//! Add `interlock` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! interlock = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use interlock::prelude::*;
//! use std::sync::Arc;
//!
//! // Bind a locking strategy to an engine-side state table
//! let table = StateTable::new(Arc::new(MutexHooks::new()));
//!
//! // The engine opens a state, enters exclusive sections, and closes it
//! let state = table.open()?;
//! {
//!     let _guard = table.enter(&state)?;
//!     // read or mutate interpreter state; this thread is the sole holder
//! }
//! table.close(state)?;
//! # Ok::<(), interlock::Error>(())
//! ```
//!
//! ### Supplying Your Own Hooks
//!
//! Hosts with their own locking primitives implement [`ConcurrencyHooks`]; all four
//! operations have default no-op bodies, so only the behavior you care about needs
//! writing:
//!
//! ```rust
//! use interlock::{ConcurrencyHooks, StateId};
//!
//! struct TracingHooks;
//!
//! impl ConcurrencyHooks for TracingHooks {
//!     fn acquire(&self, state: StateId) {
//!         eprintln!("entering state {}", state);
//!     }
//!
//!     fn release(&self, state: StateId) {
//!         eprintln!("leaving state {}", state);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! `interlock` is organized into two modules:
//!
//! - [`hooks`] - The [`ConcurrencyHooks`] contract and the shipped implementations:
//!   [`NoopHooks`], [`MutexHooks`], [`ReentrantHooks`]
//! - [`state`] - Typed state identity ([`StateId`], [`StateHandle`]) and the
//!   engine-side binding ([`StateTable`], [`StateGuard`])
//!
//! ### The Contract
//!
//! For a fixed state `S`, the engine guarantees that `on_open(S)` runs exactly once
//! before the first `acquire(S)`, every `acquire(S)` is matched by exactly one later
//! `release(S)`, and `on_close(S)` runs exactly once after the last `release(S)` as
//! the final hook call for `S`. The host guarantees in return that between matched
//! acquire/release calls the calling thread is the sole holder of `S`.
//!
//! ### Reentrancy
//!
//! The baseline contract is non-reentrant: a thread calling `acquire` for a state it
//! already holds deadlocks, and nothing detects or recovers that. Engines whose
//! internal call paths can re-enter a state on one thread must bind
//! [`ReentrantHooks`] (or a host lock with equivalent semantics) instead of
//! [`MutexHooks`].
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use interlock::{Error, NoopHooks, StateTable};
//! use std::sync::Arc;
//!
//! let table = StateTable::new(Arc::new(NoopHooks));
//! let state = table.open()?;
//! let id = state.id();
//! table.close(state)?;
//!
//! match table.acquire(id) {
//!     Err(Error::StaleState(_)) => { /* use-after-close caught */ }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # Ok::<(), interlock::Error>(())
//! ```
//!
//! `acquire` and `release` on the hook trait itself carry no error channel by
//! contract; misuse that bypasses the typed table remains a documented programming
//! error.

pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use interlock::prelude::*;
/// use std::sync::Arc;
///
/// let table = StateTable::new(Arc::new(NoopHooks));
/// let state = table.open()?;
/// table.close(state)?;
/// # Ok::<(), interlock::Error>(())
/// ```
pub mod prelude;

/// The concurrency hook contract and its shipped implementations.
///
/// # Key Types
///
/// - [`ConcurrencyHooks`] - the four-operation contract a host implements
/// - [`NoopHooks`] - identity hooks for single-threaded embeddings
/// - [`MutexHooks`] - one non-reentrant mutex per open state
/// - [`ReentrantHooks`] - reentrant adapter for nested acquisition
pub mod hooks;

/// Typed interpreter-state identity and the engine-side binding.
///
/// # Key Types
///
/// - [`StateId`] - generation-counted `Copy` identifier hooks receive
/// - [`StateHandle`] - owned handle spanning one open/close cycle
/// - [`StateTable`] - slot table driving the injected hooks
/// - [`StateGuard`] - RAII exclusive section
pub mod state;

/// Alias for a Result with `interlock::Error` as the error type
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use hooks::{ConcurrencyHooks, MutexHooks, NoopHooks, ReentrantHooks};
pub use state::{StateGuard, StateHandle, StateId, StateTable};
