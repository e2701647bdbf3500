//! Server core functionality
//!
//! This module contains the listener, configuration, and the accept loop
//! that hands every connection to its own session task.

pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::Server;
