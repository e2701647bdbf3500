//! Module `state`
//!
//! Defines the `Session` struct that tracks one connection from accept to
//! close: its lifecycle state, negotiated display name and outbound sink.

use log::debug;

use crate::client::ClientSink;

/// Lifecycle of a client connection.
///
/// `Connecting -> Naming -> Active -> Closing -> Closed`. A session that
/// fails during naming goes straight from `Naming` to `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Naming,
    Active,
    Closing,
    Closed,
}

/// Per-connection state.
pub struct Session {
    peer: String,
    username: Option<String>,
    state: SessionState,
    sink: ClientSink,
}

impl Session {
    pub fn new(peer: impl Into<String>, sink: ClientSink) -> Self {
        Self {
            peer: peer.into(),
            username: None,
            state: SessionState::Connecting,
            sink,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Remote address, used for logging.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Display name, set once the session has claimed one.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sink(&self) -> &ClientSink {
        &self.sink
    }

    /// Label for log lines: the display name if known, else the peer address.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.peer)
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Moves to `next`. `Closed` is terminal and never left.
    pub fn set_state(&mut self, next: SessionState) {
        if self.state == SessionState::Closed {
            return;
        }
        debug!("Session {}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }

    /// Queues a frame for this session's own peer.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.sink.send(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_is_terminal() {
        let (sink, mut rx) = ClientSink::channel(16);
        let mut session = Session::new("127.0.0.1:5000", sink);
        assert_eq!(session.state(), SessionState::Connecting);

        session.set_state(SessionState::Closed);
        session.set_state(SessionState::Active);

        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.send("late"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_label_prefers_username() {
        let (sink, _rx) = ClientSink::channel(16);
        let mut session = Session::new("127.0.0.1:5000", sink);
        assert_eq!(session.label(), "127.0.0.1:5000");

        session.set_username(Some("alice".into()));
        assert_eq!(session.label(), "alice");
    }
}
