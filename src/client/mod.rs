//! Client management
//!
//! Handles the shared client registry, per-connection session state, and the
//! session lifecycle from accept to close.

pub mod handler;
pub mod registry;
pub mod sink;
pub mod state;

pub use handler::handle_client;
pub use registry::ClientRegistry;
pub use sink::ClientSink;
pub use state::{Session, SessionState};
