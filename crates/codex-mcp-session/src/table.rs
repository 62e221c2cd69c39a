//! In-memory table of conversations started by this server.
//!
//! Entries live for the lifetime of the process and are never persisted.
//! The table is bounded: inserting into a full table evicts the oldest entry.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use codex_mcp_core::{SessionId, SessionRecord};

/// Concurrency-safe session table.
#[derive(Debug)]
pub struct SessionTable {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
    capacity: usize,
}

impl SessionTable {
    /// Create a table holding at most `capacity` sessions (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Insert or replace a record, evicting the oldest one if the table is full.
    pub async fn insert(&self, record: SessionRecord) {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(&record.id) && sessions.len() >= self.capacity {
            let oldest = sessions
                .values()
                .min_by_key(|r| r.created_at)
                .map(|r| r.id.clone());
            if let Some(oldest) = oldest {
                debug!("Session table full, evicting {}", oldest);
                sessions.remove(&oldest);
            }
        }

        debug!("Recording session {}", record.id);
        sessions.insert(record.id.clone(), record);
    }

    /// Look up a session.
    pub async fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Whether a session is known.
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Number of recorded sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Maximum number of sessions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new(1000)
    }
}
