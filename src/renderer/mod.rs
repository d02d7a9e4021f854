//! Multi-format rendering of semantic documents
//!
//! Each format module turns a [`SemanticDocument`] into bytes; this module
//! dispatches through the format table, pins the generation timestamp and
//! names the output file.

pub mod csv;
pub mod docx;
pub mod pdf;
pub mod text;
pub mod xlsx;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::document::{RenderedDocument, SemanticDocument};
use crate::error::RenderError;
use crate::format::DocumentFormat;

/// Render `doc` into `format`
pub fn render(
    doc: &SemanticDocument,
    format: DocumentFormat,
    config: &RenderConfig,
) -> Result<RenderedDocument, RenderError> {
    let doc = doc.stamped();
    let bytes = (format.handlers().render)(&doc, config)?;
    debug!(%format, bytes = bytes.len(), "rendered document");
    let name = file_name(&doc.title, doc.timestamp(), format, config);
    Ok(RenderedDocument::new(bytes, format, name))
}

/// Render several documents into one file: a summary page, then each item
///
/// Only PDF bundles exist. Either every item renders or no output is produced.
pub fn render_bundle(
    title: &str,
    items: &[SemanticDocument],
    format: DocumentFormat,
    config: &RenderConfig,
) -> Result<RenderedDocument, RenderError> {
    if format != DocumentFormat::PortableDocument {
        return Err(RenderError::unsupported(
            format,
            "bundles can only be rendered as PDF",
        ));
    }
    let at = Utc::now();
    let bytes = pdf::render_bundle(title, at, items, config)?;
    info!(items = items.len(), bytes = bytes.len(), "rendered bundle");
    let name = file_name(title, at, format, config);
    Ok(RenderedDocument::new(bytes, format, name))
}

/// `{sanitized title}_{timestamp}.{extension}`
pub fn file_name(
    title: &str,
    at: DateTime<Utc>,
    format: DocumentFormat,
    config: &RenderConfig,
) -> String {
    format!(
        "{}_{}.{}",
        sanitize_title(title, &config.labels.fallback_title),
        config.timestamp.file_suffix(at),
        format.extension()
    )
}

/// Keep letters, digits, `-` and `_`; whitespace runs become a single `-`
pub fn sanitize_title(title: &str, fallback: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("-");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap()
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Ata da Reunião: 2/3", "x"), "Ata-da-Reunião-23");
        assert_eq!(sanitize_title("  a \t b  ", "x"), "a-b");
        assert_eq!(sanitize_title("?!*", "document"), "document");
    }

    #[test]
    fn test_file_name() {
        let config = RenderConfig::default();
        assert_eq!(
            file_name("Relatório Final", at(), DocumentFormat::Spreadsheet, &config),
            "Relatório-Final_2024-03-05_14-07.xlsx"
        );
    }

    #[test]
    fn test_render_names_and_types_output() {
        let config = RenderConfig::default();
        let doc = SemanticDocument::new("Notas", "- a").generated_at(at());
        let out = render(&doc, DocumentFormat::DelimitedText, &config).unwrap();
        assert_eq!(out.mime_type, "text/csv");
        assert_eq!(out.file_name, "Notas_2024-03-05_14-07.csv");
    }

    #[test]
    fn test_bundle_requires_pdf() {
        let config = RenderConfig::default();
        let err = render_bundle("B", &[], DocumentFormat::WordProcessor, &config).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnsupportedFormat { format: DocumentFormat::WordProcessor, .. }
        ));
    }
}
