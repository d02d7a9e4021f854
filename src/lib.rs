//! docforge - document templating and multi-format rendering
//!
//! This library detects `{{PLACEHOLDER}}` markers in templates (plain text,
//! CSV, DOCX, XLSX), fills them with caller data while keeping the container
//! intact, and renders lightly marked-up documents to Markdown, plain text,
//! CSV, XLSX, DOCX and PDF.
//!
//! # Example
//!
//! ```rust
//! use docforge::{render, DocumentFormat, RenderConfig, SemanticDocument};
//!
//! let doc = SemanticDocument::new("Plano", "# Fase 1\n- Levantar requisitos");
//! let out = render(&doc, DocumentFormat::DelimitedText, &RenderConfig::default()).unwrap();
//! assert_eq!(out.mime_type, "text/csv");
//! assert!(out.file_name.starts_with("Plano_"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod markdown;
pub mod ooxml;
pub mod renderer;
pub mod template;

use std::collections::{BTreeMap, BTreeSet};

pub use config::RenderConfig;
pub use document::{RenderedDocument, SemanticDocument};
pub use error::{ConfigError, ExtractionError, RenderError};
pub use format::DocumentFormat;
pub use markdown::{MarkdownStructureParser, StructuredRow, StructuredTable};
pub use renderer::{render, render_bundle};
pub use template::{FillMode, PlaceholderExtractor, Template, TemplateFiller, TemplateSource};

/// Placeholder names in a file template; unreadable files yield the empty set
pub fn extract_placeholders(
    bytes: &[u8],
    mime_type: Option<&str>,
    file_name: Option<&str>,
) -> BTreeSet<String> {
    PlaceholderExtractor::shared().extract_from_file(bytes, mime_type, file_name)
}

/// Fill `template` leniently: cached placeholders without a value become empty
pub fn fill(
    template: &Template,
    data: &BTreeMap<String, String>,
) -> Result<RenderedDocument, RenderError> {
    TemplateFiller::new().fill(template, data)
}
