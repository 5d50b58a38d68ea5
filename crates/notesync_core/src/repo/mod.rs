//! Local persistence contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the store APIs the sync engine and account service depend on.
//! - Isolate SQLite query details from sync orchestration.
//!
//! # Invariants
//! - Store APIs return semantic errors (`InvalidData`) in addition to DB
//!   transport errors.

pub mod note_store;
pub mod session_store;
pub mod sqlite_store;
