//! Uploaded documents.
//!
//! The browser reads a PDF with `FileReader.readAsDataURL` and sends it as
//! `data:application/pdf;base64,...`. Bare base64 is accepted too and
//! wrapped as a PDF data URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Filename used when the client does not send one.
pub const DEFAULT_FILENAME: &str = "document.pdf";

const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// A document attached to a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    /// Base64 data URL, ready to embed in a file content part.
    pub data_url: String,
}

impl Document {
    /// Build a document without validating the payload.
    pub fn new(filename: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            data_url: data_url.into(),
        }
    }

    /// Validate a client payload and normalize it into a data URL.
    pub fn from_payload(filename: Option<&str>, payload: &str) -> Result<Self> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(Error::InvalidDocument("empty document payload".into()));
        }

        let (data_url, encoded) = match payload.strip_prefix("data:") {
            Some(rest) => {
                let (meta, encoded) = rest.split_once(',').ok_or_else(|| {
                    Error::InvalidDocument("data URL has no payload separator".into())
                })?;
                if !meta.ends_with(";base64") {
                    return Err(Error::InvalidDocument(
                        "data URL is not base64 encoded".into(),
                    ));
                }
                (payload.to_string(), encoded)
            }
            None => (format!("{PDF_DATA_URL_PREFIX}{payload}"), payload),
        };

        STANDARD
            .decode(encoded)
            .map_err(|e| Error::InvalidDocument(format!("bad base64 payload: {e}")))?;

        let filename = filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FILENAME);

        Ok(Self::new(filename, data_url))
    }

    /// Encode raw file bytes (used by the CLI when reading a local PDF).
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(
            filename,
            format!("{PDF_DATA_URL_PREFIX}{}", STANDARD.encode(bytes)),
        )
    }
}
