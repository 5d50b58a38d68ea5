//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate remote and persistence calls into use-case level APIs.
//! - Keep callers decoupled from storage and transport details.

pub mod account_service;
