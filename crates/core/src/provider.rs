//! Provider trait: the abstraction over the external completion API.
//!
//! A Provider takes the assembled message list and returns the assistant's
//! text, plus any annotations the provider attached after parsing a file.
//! Calls are single attempt; retries are the caller's business and the
//! relay never makes them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::level::Level;
use crate::message::Message;

/// Per-response token ceiling sent with every completion request.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// A completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "google/gemini-flash-1.5")
    pub model: String,

    /// System prompt, history, then the current user turn
    pub messages: Vec<Message>,

    /// Level the system prompt was chosen for
    pub level: Level,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Ask the provider to extract text from attached files
    #[serde(default)]
    pub parse_documents: bool,

    /// Referer forwarded to the provider for attribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// A successful completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The assistant's reply
    pub text: String,

    /// Opaque annotations to cache in the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,

    /// Which model actually responded (may differ from requested)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: None,
            model: None,
            usage: None,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError>;

    /// Whether credentials are present. Checked without network I/O.
    fn is_configured(&self) -> bool {
        true
    }
}
