//! Remote note/account service access.
//!
//! # Responsibility
//! - Define the `RemoteClient` seam used by sync and account code.
//! - Provide the wire types and the HTTP binding.

pub mod client;
pub mod http;
pub mod types;
