//! RAX chat server
//!
//! A multi-client text chat server: clients connect over TCP, claim a unique
//! display name, and exchange broadcast and direct messages through a small
//! slash-command protocol of newline-delimited UTF-8 lines.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::ClientRegistry;
pub use server::{Server, ServerConfig};
