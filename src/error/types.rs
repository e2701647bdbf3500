//! Error types
//!
//! Registry and session errors are recoverable and stay inside the session
//! that hit them. Only `ServerError` is fatal to the process.

use std::io;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Client registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("username cannot be empty")]
    EmptyName,

    #[error("invalid username: {0}")]
    InvalidName(String),

    #[error("username already taken: {0}")]
    NameTaken(String),

    #[error("username not registered: {0}")]
    NotRegistered(String),

    #[error("server is full ({0} clients)")]
    Full(usize),
}

/// Errors that end a single client session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("frame error: {0}")]
    Frame(#[from] LinesCodecError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("gave up after {0} failed name attempts")]
    TooManyNameAttempts(usize),

    #[error("send queue exceeded")]
    SendQueueFull,
}

impl SessionError {
    /// Whether the peer sent a line longer than the configured frame limit.
    pub fn is_frame_too_long(&self) -> bool {
        matches!(
            self,
            SessionError::Frame(LinesCodecError::MaxLineLengthExceeded)
        )
    }

    /// Whether the peer sent a line that is not valid UTF-8.
    pub fn is_invalid_utf8(&self) -> bool {
        match self {
            SessionError::Frame(LinesCodecError::Io(e)) => e.kind() == io::ErrorKind::InvalidData,
            _ => false,
        }
    }
}

/// Fatal server errors, raised only during startup
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
