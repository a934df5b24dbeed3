//! OpenRouter provider implementation.
//!
//! Speaks the OpenAI-compatible `/chat/completions` API that OpenRouter
//! exposes, plus two OpenRouter extensions:
//! - the `file-parser` plugin, which extracts text from attached PDFs
//! - `annotations` on the assistant message, which carry the parsed file so
//!   later turns can send them back instead of the PDF
//!
//! One request per call. No retries, no streaming.

use async_trait::async_trait;
use robotutor_core::error::ProviderError;
use robotutor_core::message::{Content, Message, Role};
use robotutor_core::provider::{Completion, CompletionRequest, Provider, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Status reported when the request never got an HTTP answer.
const TRANSPORT_FAILURE_STATUS: u16 = 502;

/// An OpenRouter-backed completion provider.
pub struct OpenRouterProvider {
    name: String,
    base_url: String,
    api_key: String,
    app_title: String,
    default_referer: Option<String>,
    pdf_engine: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create a provider against `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: "openrouter".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            app_title: "RobotutorAI".into(),
            default_referer: None,
            pdf_engine: "pdf-text".into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider against the public OpenRouter endpoint.
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("https://openrouter.ai/api/v1", api_key)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Title sent as `X-Title`.
    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = title.into();
        self
    }

    /// Referer used when the request does not carry its own.
    pub fn with_default_referer(mut self, referer: Option<String>) -> Self {
        self.default_referer = referer;
        self
    }

    pub fn with_pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.pdf_engine = engine.into();
        self
    }

    /// Apply a whole-request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Result<Self, ProviderError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(self)
    }

    /// Convert our Message types to the wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                },
                content: &m.content,
                annotations: m.annotations.as_ref(),
            })
            .collect()
    }

    /// Build the JSON request body.
    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "max_tokens": request.max_tokens,
        });

        if request.parse_documents {
            body["plugins"] = serde_json::json!([{
                "id": "file-parser",
                "pdf": { "engine": self.pdf_engine },
            }]);
        }

        body
    }

    /// Turn a 2xx body into a completion.
    fn parse_completion(body: &str) -> Result<Completion, ProviderError> {
        let api_response: ApiResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {e}")))?;

        if let Some(error) = api_response.error {
            return Err(ProviderError::MalformedResponse(format!(
                "error object in successful response: {error}"
            )));
        }

        let message = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;

        let text = message
            .content
            .ok_or_else(|| ProviderError::MalformedResponse("message has no content".into()))?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(Completion {
            text,
            annotations: message.annotations.filter(|a| !a.is_null()),
            model: api_response.model,
            usage,
        })
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(format!(
                "{} API key not configured",
                self.name
            )));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            level = %request.level,
            messages = request.messages.len(),
            parse_documents = request.parse_documents,
            "Sending completion request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", &self.app_title)
            .json(&body);

        if let Some(referer) = request.referer.as_ref().or(self.default_referer.as_ref()) {
            builder = builder.header("HTTP-Referer", referer);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(provider = %self.name, error = %e, "Provider request failed");
            ProviderError::Upstream {
                status: TRANSPORT_FAILURE_STATUS,
                body: e.to_string(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ProviderError::Upstream {
            status: TRANSPORT_FAILURE_STATUS,
            body: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Provider returned error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion = Self::parse_completion(&text)?;
        debug!(
            provider = %self.name,
            model = completion.model.as_deref().unwrap_or(&request.model),
            total_tokens = completion.usage.as_ref().map(|u| u.total_tokens),
            has_annotations = completion.annotations.is_some(),
            "Completion received"
        );
        Ok(completion)
    }
}

// --- OpenRouter API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    annotations: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
