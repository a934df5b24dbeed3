//! Message domain types.
//!
//! These are the value objects that flow through the relay:
//! client sends a prompt → assembler builds messages → provider answers →
//! the exchange is appended to the session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The model
    Assistant,
    /// Level instructions
    System,
}

/// Message body: plain text, or structured parts when a file is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a structured message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    File { file: FileAttachment },
}

/// An embedded file attachment (filename + base64 data URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub filename: String,
    pub file_data: String,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The body
    pub content: Content,

    /// Opaque provider annotations returned alongside an assistant reply.
    /// Sending them back in history lets the provider reuse a parsed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: Content) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            annotations: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, Content::Text(content.into()))
    }

    /// Create a new plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, Content::Text(content.into()))
    }

    /// Create a user message carrying the prompt and an attached document.
    pub fn user_with_document(prompt: impl Into<String>, document: &Document) -> Self {
        Self::new(
            Role::User,
            Content::Parts(vec![
                ContentPart::Text {
                    text: prompt.into(),
                },
                ContentPart::File {
                    file: FileAttachment {
                        filename: document.filename.clone(),
                        file_data: document.data_url.clone(),
                    },
                },
            ]),
        )
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::Text(content.into()))
    }

    pub fn with_annotations(mut self, annotations: Option<serde_json::Value>) -> Self {
        self.annotations = annotations;
        self
    }

    /// The text of this message; for structured bodies, the text parts joined.
    pub fn text(&self) -> String {
        match &self.content {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::File { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// The attached file, if this message carries one.
    pub fn attachment(&self) -> Option<&FileAttachment> {
        match &self.content {
            Content::Text(_) => None,
            Content::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::File { file } => Some(file),
                ContentPart::Text { .. } => None,
            }),
        }
    }
}
