//! Error types for extraction, filling and rendering

use thiserror::Error;

use crate::format::DocumentFormat;

/// Errors raised while projecting a template to its visible text
///
/// The lossy extractor API swallows these (logging them); the strict API
/// returns them so callers can tell "no placeholders" from "unreadable file".
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The binary container could not be opened or parsed
    #[error("could not read {format} container: {message}")]
    Container {
        format: DocumentFormat,
        message: String,
    },

    /// Neither the mime type nor the file name identify a known format
    #[error("unrecognized template format (mime type: {mime_type:?}, file name: {file_name:?})")]
    Unrecognized {
        mime_type: Option<String>,
        file_name: Option<String>,
    },

    /// Delimited text that is not valid UTF-8
    #[error("template is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl ExtractionError {
    /// Create a container error for the given format
    pub fn container(format: DocumentFormat, message: impl ToString) -> Self {
        Self::Container {
            format,
            message: message.to_string(),
        }
    }
}

/// Errors raised by the template filler and the multi-format renderer
#[derive(Debug, Error)]
pub enum RenderError {
    /// The operation has no handler for this format
    #[error("{format} is not supported: {message}")]
    UnsupportedFormat {
        format: DocumentFormat,
        message: String,
    },

    /// A format encoder failed while building its output
    #[error("failed to render {format}: {message}")]
    Render {
        format: DocumentFormat,
        message: String,
    },

    /// The template's mime type and file name match no known format
    #[error("unrecognized template format (mime type: {mime_type:?}, file name: {file_name:?})")]
    Unrecognized {
        mime_type: Option<String>,
        file_name: Option<String>,
    },

    /// Strict fills refuse to leave placeholders without a value
    #[error("missing values for placeholders: {}", missing.join(", "))]
    Validation { missing: Vec<String> },
}

impl RenderError {
    /// Create an unsupported format error
    pub fn unsupported(format: DocumentFormat, message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format,
            message: message.into(),
        }
    }

    /// Wrap an encoder failure, naming the format it happened in
    pub fn render(format: DocumentFormat, cause: impl ToString) -> Self {
        Self::Render {
            format,
            message: cause.to_string(),
        }
    }

    /// The format the failure is attributed to, if any
    pub fn format(&self) -> Option<DocumentFormat> {
        match self {
            Self::UnsupportedFormat { format, .. } | Self::Render { format, .. } => Some(*format),
            Self::Unrecognized { .. } | Self::Validation { .. } => None,
        }
    }
}

/// Errors that can occur when loading render configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
