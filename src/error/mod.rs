//! Error handling
//!
//! Defines error types for the registry, per-connection sessions and the server.

pub mod types;

pub use types::*;
