//! Documents flowing in and out of the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::DocumentFormat;

/// A generated artifact: lightly marked-up text plus its title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticDocument {
    pub title: String,
    pub body: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl SemanticDocument {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            generated_at: None,
        }
    }

    /// Set the generation timestamp
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// The generation timestamp, or now when none was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.generated_at.unwrap_or_else(Utc::now)
    }

    /// Pin the timestamp so every part of one render sees the same instant
    pub(crate) fn stamped(&self) -> SemanticDocument {
        SemanticDocument {
            generated_at: Some(self.timestamp()),
            ..self.clone()
        }
    }
}

/// The terminal output of filling or rendering, ready for the transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type().to_string(),
            file_name: file_name.into(),
        }
    }

    /// Value for a `Content-Disposition` response header
    pub fn content_disposition(&self) -> String {
        let name: String = self
            .file_name
            .chars()
            .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}
