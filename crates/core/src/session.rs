//! Session records and the store trait that holds them.
//!
//! A session is keyed by an opaque id generated by the client. It keeps the
//! recent conversation history, the annotations the provider returned after
//! parsing an uploaded document, and the name of that document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Default number of history messages kept per session (5 exchanges).
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Per-session conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Annotations returned by the provider after it first parsed a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_annotations: Option<serde_json::Value>,

    /// User/assistant messages, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<Message>,

    /// Filename of the most recently uploaded document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pdf: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            file_annotations: None,
            conversation_history: Vec::new(),
            current_pdf: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.file_annotations.is_none()
            && self.conversation_history.is_empty()
            && self.current_pdf.is_none()
    }

    /// Record one completed exchange, then trim history to `history_limit`.
    pub fn append_exchange(&mut self, exchange: Exchange, history_limit: usize) {
        let Exchange {
            user_text,
            assistant_text,
            annotations,
            uploaded_document,
        } = exchange;

        self.conversation_history.push(Message::user(user_text));
        self.conversation_history
            .push(Message::assistant(assistant_text).with_annotations(annotations.clone()));

        if annotations.is_some() {
            self.file_annotations = annotations;
        }
        if uploaded_document.is_some() {
            self.current_pdf = uploaded_document;
        }

        // Trim whole exchanges so history always opens on a user turn.
        let len = self.conversation_history.len();
        if len > history_limit {
            let excess = len - history_limit;
            self.conversation_history.drain(..excess + excess % 2);
        }
        self.updated_at = Utc::now();
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a successful chat turn commits to its session.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pub user_text: String,
    pub assistant_text: String,
    pub annotations: Option<serde_json::Value>,
    /// Set when this turn attached a document; becomes `current_pdf`.
    pub uploaded_document: Option<String>,
}

/// The session store trait.
///
/// Implementations hand out snapshots: callers read a record, release the
/// store, call the provider, and only then commit the exchange.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Return the record for `session_id`, creating an empty one if needed.
    async fn get_or_create(&self, session_id: &str) -> SessionRecord;

    /// Look up a record without creating it.
    async fn get(&self, session_id: &str) -> Option<SessionRecord>;

    /// Remove a record. Returns whether one existed.
    ///
    /// Fails with `MissingSessionId` for an empty id.
    async fn clear(&self, session_id: &str) -> Result<bool>;

    /// Commit a completed exchange to the session.
    async fn append_exchange(&self, session_id: &str, exchange: Exchange) -> Result<()>;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

/// Shorten a session id for log output.
pub fn short_id(session_id: &str) -> &str {
    match session_id.char_indices().nth(8) {
        Some((idx, _)) => &session_id[..idx],
        None => session_id,
    }
}
