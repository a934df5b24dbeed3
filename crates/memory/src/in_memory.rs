//! In-memory session store: the process-wide map from session id to record.
//!
//! State lives for the lifetime of the process; a restart loses everything.

use async_trait::async_trait;
use robotutor_core::error::{Error, Result};
use robotutor_core::session::{
    DEFAULT_HISTORY_LIMIT, Exchange, SessionRecord, SessionStore, short_id,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A session store backed by a `HashMap` behind an async `RwLock`.
///
/// The lock is only held for the duration of a single map operation, never
/// across a provider call. Two concurrent exchanges on the same session are
/// applied one after the other in whatever order they commit.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    history_limit: usize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            history_limit,
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_or_create(&self, session_id: &str) -> SessionRecord {
        // Requests without an id get a fresh record that is never stored.
        if session_id.is_empty() {
            return SessionRecord::new();
        }

        if let Some(record) = self.sessions.read().await.get(session_id) {
            return record.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session = %short_id(session_id), "Created session");
                SessionRecord::new()
            })
            .clone()
    }

    async fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        if session_id.is_empty() {
            return Err(Error::MissingSessionId);
        }
        let removed = self.sessions.write().await.remove(session_id).is_some();
        debug!(session = %short_id(session_id), removed, "Cleared session");
        Ok(removed)
    }

    async fn append_exchange(&self, session_id: &str, exchange: Exchange) -> Result<()> {
        if session_id.is_empty() {
            return Err(Error::MissingSessionId);
        }
        let mut sessions = self.sessions.write().await;
        // A clear that landed while the provider call was in flight does not
        // swallow the exchange; the session starts over from this turn.
        let record = sessions.entry(session_id.to_string()).or_default();
        record.append_exchange(exchange, self.history_limit);
        debug!(
            session = %short_id(session_id),
            history = record.conversation_history.len(),
            has_annotations = record.file_annotations.is_some(),
            "Appended exchange"
        );
        Ok(())
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
