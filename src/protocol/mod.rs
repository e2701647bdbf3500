//! Chat protocol
//!
//! Newline-delimited UTF-8 frames, command parsing, dispatch, and the text
//! of every server reply.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::handle_command;
