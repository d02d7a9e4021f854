//! The closed set of document formats and their handler table
//!
//! Every format-dependent decision in the crate goes through [`DocumentFormat`]:
//! a template is classified once from its declared mime type and file name,
//! and the per-format extractor, filler and renderer come from a single table.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::document::SemanticDocument;
use crate::error::{ExtractionError, RenderError};
use crate::ooxml;
use crate::renderer;
use crate::template::substitute;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A document container or text format understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    Markdown,
    PlainText,
    DelimitedText,
    Spreadsheet,
    WordProcessor,
    PortableDocument,
}

/// Projects raw bytes to the text scanned for placeholders.
/// `Ok(None)` means the format cannot be scanned at all.
pub type VisibleTextFn = fn(&[u8]) -> Result<Option<String>, ExtractionError>;

/// Substitutes effective data into a template container
pub type FillFn =
    fn(DocumentFormat, &[u8], &BTreeMap<String, String>) -> Result<Vec<u8>, RenderError>;

/// Encodes a semantic document into the format's bytes
pub type RenderFn = fn(&SemanticDocument, &RenderConfig) -> Result<Vec<u8>, RenderError>;

/// Everything the engine knows about one format
pub struct FormatHandlers {
    pub format: DocumentFormat,
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub visible_text: VisibleTextFn,
    pub fill: FillFn,
    pub render: RenderFn,
}

static HANDLERS: [FormatHandlers; 6] = [
    FormatHandlers {
        format: DocumentFormat::Markdown,
        extension: "md",
        mime_type: "text/markdown",
        visible_text: utf8_visible_text,
        fill: substitute::fill_utf8,
        render: renderer::text::render_markdown,
    },
    FormatHandlers {
        format: DocumentFormat::PlainText,
        extension: "txt",
        mime_type: "text/plain",
        visible_text: utf8_visible_text,
        fill: substitute::fill_utf8,
        render: renderer::text::render_plain,
    },
    FormatHandlers {
        format: DocumentFormat::DelimitedText,
        extension: "csv",
        mime_type: "text/csv",
        visible_text: utf8_visible_text,
        fill: substitute::fill_utf8,
        render: renderer::csv::render_csv,
    },
    FormatHandlers {
        format: DocumentFormat::Spreadsheet,
        extension: "xlsx",
        mime_type: XLSX_MIME,
        visible_text: ooxml::xlsx::visible_text,
        fill: ooxml::xlsx::fill,
        render: renderer::xlsx::render_xlsx,
    },
    FormatHandlers {
        format: DocumentFormat::WordProcessor,
        extension: "docx",
        mime_type: DOCX_MIME,
        visible_text: ooxml::docx::visible_text,
        fill: ooxml::docx::fill,
        render: renderer::docx::render_docx,
    },
    FormatHandlers {
        format: DocumentFormat::PortableDocument,
        extension: "pdf",
        mime_type: "application/pdf",
        visible_text: pdf_visible_text,
        fill: pdf_fill,
        render: renderer::pdf::render_pdf,
    },
];

fn utf8_visible_text(bytes: &[u8]) -> Result<Option<String>, ExtractionError> {
    Ok(Some(String::from_utf8(bytes.to_vec())?))
}

// Placeholders are never read out of PDFs
fn pdf_visible_text(_bytes: &[u8]) -> Result<Option<String>, ExtractionError> {
    Ok(None)
}

fn pdf_fill(
    format: DocumentFormat,
    _bytes: &[u8],
    _data: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    Err(RenderError::unsupported(
        format,
        "this format cannot be auto-filled; use a word-processor (DOCX) or spreadsheet (XLSX) template instead",
    ))
}

impl DocumentFormat {
    /// All formats, in table order
    pub fn all() -> impl Iterator<Item = DocumentFormat> {
        HANDLERS.iter().map(|h| h.format)
    }

    /// The handler row for this format
    pub fn handlers(self) -> &'static FormatHandlers {
        // The table holds exactly one row per variant, in declaration order
        &HANDLERS[self as usize]
    }

    /// Canonical file extension, without the dot
    pub fn extension(self) -> &'static str {
        self.handlers().extension
    }

    /// Canonical mime type
    pub fn mime_type(self) -> &'static str {
        self.handlers().mime_type
    }

    /// Look a format up by extension (case-insensitive, leading dot allowed)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "markdown" => Some(DocumentFormat::Markdown),
            "text" => Some(DocumentFormat::PlainText),
            _ => HANDLERS
                .iter()
                .find(|h| h.extension == ext)
                .map(|h| h.format),
        }
    }

    /// Look a format up by mime type, ignoring parameters such as `charset`
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/x-markdown" => Some(DocumentFormat::Markdown),
            "application/csv" | "text/comma-separated-values" => {
                Some(DocumentFormat::DelimitedText)
            }
            _ => HANDLERS
                .iter()
                .find(|h| h.mime_type == essence)
                .map(|h| h.format),
        }
    }

    /// Classify a template from its declared mime type and original file name
    ///
    /// The mime type wins when it is specific; generic types such as
    /// `application/octet-stream` fall back to the file extension.
    pub fn classify(mime_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        mime_type
            .and_then(Self::from_mime_type)
            .or_else(|| {
                file_name
                    .and_then(|name| Path::new(name).extension())
                    .and_then(|ext| ext.to_str())
                    .and_then(Self::from_extension)
            })
    }

    /// Parse a user-facing format name (`pdf`, `docx`, `markdown`, ...)
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "plain" | "plain-text" => Some(DocumentFormat::PlainText),
            "delimited-text" => Some(DocumentFormat::DelimitedText),
            "spreadsheet" => Some(DocumentFormat::Spreadsheet),
            "word" | "word-processor" => Some(DocumentFormat::WordProcessor),
            "portable-document" => Some(DocumentFormat::PortableDocument),
            other => Self::from_extension(other),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Markdown => "Markdown",
            DocumentFormat::PlainText => "plain text",
            DocumentFormat::DelimitedText => "CSV",
            DocumentFormat::Spreadsheet => "XLSX",
            DocumentFormat::WordProcessor => "DOCX",
            DocumentFormat::PortableDocument => "PDF",
        };
        f.write_str(name)
    }
}
