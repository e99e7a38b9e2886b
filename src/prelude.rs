//! # interlock Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the interlock library. Import this module to get quick access to the essential
//! types for wiring a hook set into an interpreter engine.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all interlock operations
pub use crate::Error;

/// The result type used throughout interlock
pub use crate::Result;

// ================================================================================================
// Hook Contract and Shipped Implementations
// ================================================================================================

/// The host-supplied concurrency and lifecycle hook contract
pub use crate::hooks::ConcurrencyHooks;

/// The identity implementation for single-threaded embeddings
pub use crate::hooks::NoopHooks;

/// Non-reentrant per-state mutex hooks
pub use crate::hooks::MutexHooks;

/// Reentrant per-state lock hooks
pub use crate::hooks::ReentrantHooks;

// ================================================================================================
// Engine-Side Binding
// ================================================================================================

/// Typed interpreter-state identity and handles
pub use crate::state::{StateHandle, StateId};

/// The engine-side binding table and its RAII exclusive section
pub use crate::state::{StateGuard, StateTable};
