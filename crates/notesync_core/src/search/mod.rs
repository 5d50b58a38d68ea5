//! Note search entry points.
//!
//! # Responsibility
//! - Filter and group already-loaded notes for list views.
//! - Keep result shaping inside core.

pub mod notes;
