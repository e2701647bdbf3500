//! Client registry
//!
//! The single source of truth mapping display names to outbound sinks.
//! All reads and mutations go through one mutex; network writes never happen
//! while it is held (callers iterate a [`ClientRegistry::snapshot`] instead).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::ClientSink;
use crate::error::RegistryError;

pub const DEFAULT_MAX_NAME_LENGTH: usize = 32;

struct Entry {
    sink: ClientSink,
    /// Join order; renames move the entry to the back.
    seq: u64,
}

#[derive(Default)]
struct Inner {
    clients: HashMap<String, Entry>,
    next_seq: u64,
}

impl Inner {
    fn insert(&mut self, name: String, sink: ClientSink) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.clients.insert(name, Entry { sink, seq });
    }
}

/// Shared, cloneable handle to the set of registered users.
#[derive(Clone)]
pub struct ClientRegistry {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
    max_name_length: usize,
}

impl ClientRegistry {
    /// Registry with no capacity limit and the default name length.
    pub fn new() -> Self {
        Self::with_limits(usize::MAX, DEFAULT_MAX_NAME_LENGTH)
    }

    pub fn with_limits(capacity: usize, max_name_length: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capacity,
            max_name_length,
        }
    }

    /// Checks a candidate name against the naming policy.
    ///
    /// Names must be non-empty, contain no whitespace (so `/dm <name>` can
    /// address them) and fit in `max_name_length` characters.
    pub fn validate_name(&self, name: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) || name.chars().count() > self.max_name_length {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Registers `name` for `sink` if the name is valid and free.
    ///
    /// Concurrent claims of the same name have exactly one winner.
    pub async fn try_claim(&self, name: &str, sink: ClientSink) -> Result<(), RegistryError> {
        self.validate_name(name)?;

        let mut inner = self.inner.lock().await;
        if inner.clients.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        if inner.clients.len() >= self.capacity {
            return Err(RegistryError::Full(self.capacity));
        }
        debug_assert!(
            !inner.clients.values().any(|e| e.sink.same_peer(&sink)),
            "sink registered twice"
        );

        inner.insert(name.to_string(), sink);
        Ok(())
    }

    /// Moves the entry for `old` to `new`, keeping its sink.
    ///
    /// Fails without touching `old` if `new` is invalid or already present.
    pub async fn rename(&self, old: &str, new: &str) -> Result<(), RegistryError> {
        self.validate_name(new)?;

        let mut inner = self.inner.lock().await;
        if inner.clients.contains_key(new) {
            return Err(RegistryError::NameTaken(new.to_string()));
        }
        let entry = inner
            .clients
            .remove(old)
            .ok_or_else(|| RegistryError::NotRegistered(old.to_string()))?;

        inner.insert(new.to_string(), entry.sink);
        Ok(())
    }

    /// Removes `name` if present. Safe to call more than once.
    pub async fn remove(&self, name: &str) -> Option<ClientSink> {
        self.inner.lock().await.clients.remove(name).map(|e| e.sink)
    }

    pub async fn lookup(&self, name: &str) -> Option<ClientSink> {
        self.inner
            .lock()
            .await
            .clients
            .get(name)
            .map(|e| e.sink.clone())
    }

    /// Point-in-time copy of all entries in join order.
    ///
    /// The lock is released before this returns, so callers may write to the
    /// sinks without stalling other sessions.
    pub async fn snapshot(&self) -> Vec<(String, ClientSink)> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<(u64, String, ClientSink)> = inner
            .clients
            .iter()
            .map(|(name, e)| (e.seq, name.clone(), e.sink.clone()))
            .collect();
        drop(inner);

        entries.sort_unstable_by_key(|(seq, _, _)| *seq);
        entries
            .into_iter()
            .map(|(_, name, sink)| (name, sink))
            .collect()
    }

    /// Registered names in join order.
    pub async fn names(&self) -> Vec<String> {
        self.snapshot()
            .await
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.clients.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
