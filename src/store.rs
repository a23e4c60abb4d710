//! Store Module
//!
//! The shared in-memory key-value mapping.
//!
//! ## Concurrency
//! One `parking_lot::Mutex` guards the whole map. Every operation takes the
//! lock exactly once and never performs I/O while holding it, so each call is
//! atomic and calls from different sessions are linearizable.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Volatile key-value store shared by all sessions
///
/// Created once per server and handed to sessions as `Arc<Store>`.
#[derive(Debug, Default)]
pub struct Store {
    entries: Mutex<HashMap<String, String>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.entries.lock().insert(key, value);
    }

    /// Remove `key`, returning whether it was present
    pub fn delete(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry, returning how many were removed
    ///
    /// Destructive and unconfirmed. Not reachable from the wire protocol.
    pub fn clear(&self) -> usize {
        let dropped = {
            let mut entries = self.entries.lock();
            let dropped = entries.len();
            entries.clear();
            dropped
        };
        tracing::warn!(dropped, "Store cleared");
        dropped
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
