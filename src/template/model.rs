//! The template record exchanged with the persistence layer

use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::extractor::PlaceholderExtractor;
use crate::format::DocumentFormat;

/// Where a template's content lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TemplateSource {
    /// Inline text
    #[serde(rename_all = "camelCase")]
    Text { text_content: String },
    /// An uploaded file; bytes travel as base64
    #[serde(rename_all = "camelCase")]
    File {
        #[serde(with = "base64_bytes")]
        file_bytes: Vec<u8>,
        mime_type: Option<String>,
        file_name: Option<String>,
    },
}

/// A stored template and its cached placeholder set
///
/// The placeholder set is computed once at creation and only changes through
/// [`Template::refresh_placeholders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(flatten)]
    pub source: TemplateSource,
    #[serde(default)]
    pub placeholders: BTreeSet<String>,
}

impl Template {
    /// An inline text template
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        let placeholders = PlaceholderExtractor::shared().extract_from_text(&content);
        Self {
            source: TemplateSource::Text {
                text_content: content,
            },
            placeholders,
        }
    }

    /// A file template; unreadable files get an empty placeholder set
    pub fn file(bytes: Vec<u8>, mime_type: Option<String>, file_name: Option<String>) -> Self {
        let placeholders = PlaceholderExtractor::shared().extract_from_file(
            &bytes,
            mime_type.as_deref(),
            file_name.as_deref(),
        );
        Self {
            source: TemplateSource::File {
                file_bytes: bytes,
                mime_type,
                file_name,
            },
            placeholders,
        }
    }

    /// A file template whose bytes arrive base64-encoded
    pub fn from_base64(
        encoded: &str,
        mime_type: Option<String>,
        file_name: Option<String>,
    ) -> Result<Self, base64::DecodeError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Ok(Self::file(bytes, mime_type, file_name))
    }

    /// Replace the placeholder set with a previously cached one
    pub fn with_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholders = placeholders.into_iter().map(Into::into).collect();
        self
    }

    /// Re-scan the content after an explicit update
    pub fn refresh_placeholders(&mut self) {
        let extractor = PlaceholderExtractor::shared();
        self.placeholders = match &self.source {
            TemplateSource::Text { text_content } => extractor.extract_from_text(text_content),
            TemplateSource::File {
                file_bytes,
                mime_type,
                file_name,
            } => extractor.extract_from_file(file_bytes, mime_type.as_deref(), file_name.as_deref()),
        };
    }

    /// The container format; inline text counts as plain text
    pub fn format(&self) -> Option<DocumentFormat> {
        match &self.source {
            TemplateSource::Text { .. } => Some(DocumentFormat::PlainText),
            TemplateSource::File {
                mime_type,
                file_name,
                ..
            } => DocumentFormat::classify(mime_type.as_deref(), file_name.as_deref()),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.source {
            TemplateSource::Text { .. } => None,
            TemplateSource::File { file_name, .. } => file_name.as_deref(),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match &self.source {
            TemplateSource::Text { .. } => None,
            TemplateSource::File { mime_type, .. } => mime_type.as_deref(),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
