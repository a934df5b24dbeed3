//! Prompt assembly: turns a session snapshot and a user turn into the
//! ordered message list sent to the provider.
//!
//! The order is fixed and the provider depends on it:
//!
//! 1. **System**: the level prompt
//! 2. **History**: the session's stored exchanges, oldest first
//! 3. **Current turn**: a document turn or a plain-text turn
//!
//! A document is only re-sent when the session has never had it parsed
//! (no annotations yet) or the client switched to a different file. In
//! every other case the annotations carried in history stand in for it.

use robotutor_core::document::Document;
use robotutor_core::error::{Error, Result};
use robotutor_core::level::Level;
use robotutor_core::message::Message;
use robotutor_core::session::SessionRecord;

// ── Types ─────────────────────────────────────────────────────────────────

/// All inputs required to assemble a single provider call.
pub struct AssemblyInput<'a> {
    /// Complexity level (selects the system prompt).
    pub level: Level,
    /// Session snapshot; a transient empty record in stateless mode.
    pub session: &'a SessionRecord,
    /// The user's prompt text.
    pub prompt: &'a str,
    /// Document payload sent with this turn, if any.
    pub document: Option<&'a Document>,
    /// The client says this question is about its uploaded document.
    pub document_prompt: bool,
}

/// How the current user turn was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Prompt text plus the embedded file.
    Document,
    /// Plain text about a document the provider already parsed.
    FollowUp,
    /// Plain text, no document involved.
    Plain,
}

impl TurnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnKind::Document => "document",
            TurnKind::FollowUp => "follow_up",
            TurnKind::Plain => "plain",
        }
    }
}

/// The assembled prompt, ready for a provider call.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// System message, history, then the current turn.
    pub messages: Vec<Message>,
    /// Which branch produced the current turn.
    pub turn: TurnKind,
    /// Filename to record as the session's current document on success.
    pub uploaded_document: Option<String>,
}

// ── Assembly ──────────────────────────────────────────────────────────────

/// Assemble the message list for one chat turn.
///
/// Rejects empty or whitespace-only prompts before anything else happens.
pub fn assemble(input: &AssemblyInput<'_>) -> Result<AssembledPrompt> {
    if input.prompt.trim().is_empty() {
        return Err(Error::EmptyPrompt);
    }

    let history = &input.session.conversation_history;
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(input.level.system_prompt()));
    messages.extend(history.iter().cloned());

    let (turn, uploaded_document) = match input.document {
        Some(document) if needs_upload(input.session, document) => {
            messages.push(Message::user_with_document(input.prompt, document));
            (TurnKind::Document, Some(document.filename.clone()))
        }
        _ => {
            messages.push(Message::user(input.prompt));
            let kind = if input.document_prompt && input.session.file_annotations.is_some() {
                TurnKind::FollowUp
            } else {
                TurnKind::Plain
            };
            (kind, None)
        }
    };

    Ok(AssembledPrompt {
        messages,
        turn,
        uploaded_document,
    })
}

/// A document must be sent when the provider has not parsed it for this
/// session yet.
fn needs_upload(session: &SessionRecord, document: &Document) -> bool {
    session.file_annotations.is_none()
        || session.current_pdf.as_deref() != Some(document.filename.as_str())
}
