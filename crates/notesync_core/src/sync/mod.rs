//! Local/remote note reconciliation.
//!
//! # Responsibility
//! - Orchestrate the local store and remote client under the current
//!   session and connectivity.
//! - Publish change notifications after local mutations.
//!
//! # Invariants
//! - Callers serialize concurrent edits of the same note id.
//! - Every single-note operation returns exactly one of a confirmation or an
//!   error.

pub mod engine;
pub mod error;
pub mod events;
pub mod undo;
