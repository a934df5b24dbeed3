//! The chat orchestrator.
//!
//! One call to [`Tutor::chat`] handles one client request:
//!
//! 1. **Validate** prompt and level, decode the document payload
//! 2. **Resolve** the session (or a transient record without an id)
//! 3. **Assemble** system prompt + history + current turn
//! 4. **Complete** via the provider, single attempt
//! 5. **Commit** the exchange to the session, only after success
//!
//! The session store is never locked across the provider call, and no
//! failure path writes to it.

use std::sync::Arc;

use robotutor_config::AppConfig;
use robotutor_core::document::Document;
use robotutor_core::error::{Error, ProviderError, Result};
use robotutor_core::level::Level;
use robotutor_core::provider::{CompletionRequest, DEFAULT_MAX_TOKENS, Provider};
use robotutor_core::session::{Exchange, SessionRecord, SessionStore, short_id};
use tracing::{debug, info, warn};

use crate::assembler::{AssemblyInput, TurnKind, assemble};

/// Error message for a request missing its prompt or level.
pub const MISSING_FIELDS_MESSAGE: &str = "Prompt and level are required";

/// A chat request as received from the client, before validation.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    pub prompt: Option<String>,
    pub level: Option<String>,
    pub document_prompt: bool,
    /// Base64 data URL (or bare base64) of the uploaded PDF.
    pub pdf_data: Option<String>,
    pub file_name: Option<String>,
    pub session_id: Option<String>,
    /// Referer of the incoming request, forwarded to the provider.
    pub referer: Option<String>,
}

/// The result of a successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub has_annotations: bool,
    pub turn: TurnKind,
}

/// Wires level policy, session store, prompt assembly and the provider.
pub struct Tutor {
    provider: Arc<dyn Provider>,
    sessions: Arc<dyn SessionStore>,
    model: String,
    max_tokens: u32,
}

impl Tutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        sessions: Arc<dyn SessionStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            sessions,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a tutor with the model and token ceiling from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self::new(provider, sessions, config.provider.model.clone())
            .with_max_tokens(config.provider.max_tokens)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Handle one chat turn end to end.
    pub async fn chat(&self, turn: ChatTurn) -> Result<ChatReply> {
        let ChatTurn {
            prompt,
            level,
            document_prompt,
            pdf_data,
            file_name,
            session_id,
            referer,
        } = turn;

        let (Some(prompt), Some(level)) = (
            prompt.filter(|p| !p.is_empty()),
            level.filter(|l| !l.is_empty()),
        ) else {
            return Err(Error::MissingField(MISSING_FIELDS_MESSAGE.into()));
        };
        let level: Level = level.parse()?;

        let session_id = session_id.filter(|id| !id.is_empty());
        info!(
            level = %level,
            document_prompt,
            has_pdf = pdf_data.is_some(),
            session = session_id.as_deref().map(short_id).unwrap_or("-"),
            "Chat request"
        );

        if !self.provider.is_configured() {
            warn!(provider = %self.provider.name(), "Provider API key not configured");
            return Err(ProviderError::NotConfigured(format!(
                "{} API key not configured",
                self.provider.name()
            ))
            .into());
        }

        let document = match pdf_data.as_deref() {
            Some(data) if document_prompt && !data.is_empty() => {
                Some(Document::from_payload(file_name.as_deref(), data)?)
            }
            _ => None,
        };

        let session = match session_id.as_deref() {
            Some(id) => self.sessions.get_or_create(id).await,
            None => SessionRecord::new(),
        };

        let assembled = assemble(&AssemblyInput {
            level,
            session: &session,
            prompt: &prompt,
            document: document.as_ref(),
            document_prompt,
        })?;
        debug!(
            turn = assembled.turn.as_str(),
            messages = assembled.messages.len(),
            "Assembled prompt"
        );

        let completion = self
            .provider
            .complete(CompletionRequest {
                model: self.model.clone(),
                messages: assembled.messages,
                level,
                max_tokens: self.max_tokens,
                parse_documents: true,
                referer,
            })
            .await
            .inspect_err(|e| warn!(error = %e, "Completion failed"))?;

        let has_annotations = completion.annotations.is_some();
        if let Some(id) = session_id.as_deref() {
            self.sessions
                .append_exchange(
                    id,
                    Exchange {
                        user_text: prompt,
                        assistant_text: completion.text.clone(),
                        annotations: completion.annotations,
                        uploaded_document: assembled.uploaded_document,
                    },
                )
                .await?;
            if has_annotations {
                info!(session = %short_id(id), "Stored file annotations");
            }
        }

        Ok(ChatReply {
            text: completion.text,
            has_annotations,
            turn: assembled.turn,
        })
    }

    /// Drop a session's document, annotations, and history.
    pub async fn clear(&self, session_id: Option<&str>) -> Result<bool> {
        let id = session_id
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingSessionId)?;
        let removed = self.sessions.clear(id).await?;
        info!(session = %short_id(id), removed, "Session cleared");
        Ok(removed)
    }
}
