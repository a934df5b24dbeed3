//! Error types for the RoboTutor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Every variant is terminal for the request that produced it; nothing is
//! retried and no session state is committed on an error path.

use thiserror::Error;

/// The top-level error type for all RoboTutor operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Invalid level: {0}. Expected a value from 1 to 5")]
    InvalidLevel(String),

    #[error("Session ID is required")]
    MissingSessionId,

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("{0}")]
    MissingField(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // --- Provider errors ---
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl Error {
    /// The HTTP status this error surfaces as at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidLevel(_)
            | Error::MissingSessionId
            | Error::EmptyPrompt
            | Error::MissingField(_)
            | Error::InvalidDocument(_) => 400,
            Error::Provider(e) => e.status_code(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the outbound call to the model provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Transport failure or a non-success status from the provider.
    #[error("Upstream API error: {status}. {body}")]
    Upstream { status: u16, body: String },

    /// The provider answered 2xx but without the expected completion fields.
    #[error("Unexpected response format from the model provider: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderError::Upstream { status, .. } => *status,
            ProviderError::MalformedResponse(_) | ProviderError::NotConfigured(_) => 500,
        }
    }
}
