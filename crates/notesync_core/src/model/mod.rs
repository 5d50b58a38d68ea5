//! Domain model for notes and accounts.
//!
//! # Responsibility
//! - Define canonical data structures used by storage, remote and sync code.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion goes through a soft-delete marker before the row is removed.

pub mod note;
pub mod user;
