//! Outbound sink for one connected peer.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Default number of frames a peer may have queued before it is dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Handle that queues frames for exactly one peer.
///
/// Every frame addressed to a peer, whether its own replies or other users'
/// messages, goes through its single sink, so the peer sees them in the order
/// they were queued. Sending never blocks; the peer's writer task performs
/// the actual network write. A peer that lets its queue fill up is marked as
/// overflowed and its session tears itself down.
#[derive(Debug, Clone)]
pub struct ClientSink {
    tx: mpsc::Sender<String>,
    overflow: CancellationToken,
}

impl ClientSink {
    /// Creates a sink holding at most `capacity` queued frames, along with
    /// the receiver its writer task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            tx,
            overflow: CancellationToken::new(),
        };
        (sink, rx)
    }

    /// Queues one frame. Returns `false` if the peer is gone or its queue is full.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        match self.tx.try_send(frame.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.overflow.cancel();
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Whether both handles point at the same peer.
    pub fn same_peer(&self, other: &ClientSink) -> bool {
        self.tx.same_channel(&other.tx)
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflow.is_cancelled()
    }

    /// Resolves once a send has found this peer's queue full.
    pub async fn overflowed(&self) {
        self.overflow.cancelled().await
    }
}
