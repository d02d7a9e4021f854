//! Placeholder detection
//!
//! A placeholder is `{{NAME}}` where `NAME` matches `[A-Z_][A-Z0-9_]*`, with
//! no whitespace inside the braces. The pattern runs over the "visible text"
//! of a template: the raw string for text formats, paragraph text for DOCX
//! and string cells for XLSX.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::format::DocumentFormat;

const PLACEHOLDER_PATTERN: &str = r"\{\{([A-Z_][A-Z0-9_]*)\}\}";

static SHARED: Lazy<PlaceholderExtractor> = Lazy::new(PlaceholderExtractor::new);

/// Scans templates for placeholder names
#[derive(Debug, Clone)]
pub struct PlaceholderExtractor {
    pattern: Regex,
}

impl Default for PlaceholderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"),
        }
    }

    /// A process-wide instance, compiled on first use
    pub fn shared() -> &'static PlaceholderExtractor {
        &SHARED
    }

    /// Distinct placeholder names in `content`
    pub fn extract_from_text(&self, content: &str) -> BTreeSet<String> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Distinct placeholder names in a file template, reporting unreadable files
    ///
    /// PDFs always yield the empty set: their text is never scanned.
    pub fn try_extract_from_file(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<BTreeSet<String>, ExtractionError> {
        let format = DocumentFormat::classify(mime_type, file_name).ok_or_else(|| {
            ExtractionError::Unrecognized {
                mime_type: mime_type.map(str::to_string),
                file_name: file_name.map(str::to_string),
            }
        })?;
        let names = match visible_text(bytes, format)? {
            Some(text) => self.extract_from_text(&text),
            None => BTreeSet::new(),
        };
        debug!(%format, count = names.len(), "extracted placeholders");
        Ok(names)
    }

    /// Distinct placeholder names in a file template
    ///
    /// Unreadable or unrecognized files degrade to the empty set; the failure
    /// is logged. Use [`Self::try_extract_from_file`] to observe it instead.
    pub fn extract_from_file(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
        file_name: Option<&str>,
    ) -> BTreeSet<String> {
        self.try_extract_from_file(bytes, mime_type, file_name)
            .unwrap_or_else(|err| {
                warn!(
                    error = %err,
                    file_name = file_name.unwrap_or("<unnamed>"),
                    "placeholder extraction failed, treating template as having none"
                );
                BTreeSet::new()
            })
    }
}

/// The text placeholders are scanned in, or `None` for formats never scanned
pub fn visible_text(bytes: &[u8], format: DocumentFormat) -> Result<Option<String>, ExtractionError> {
    (format.handlers().visible_text)(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_distinct_names() {
        let extractor = PlaceholderExtractor::new();
        let found = extractor.extract_from_text("{{NOME}} e {{CPF}} e {{NOME}} de novo");
        assert_eq!(found, names(&["CPF", "NOME"]));
    }

    #[test]
    fn test_malformed_markers_ignored() {
        let extractor = PlaceholderExtractor::new();
        let text = "{{ NOME }} {{nome}} {NOME} {{1ABC}} {{NO-ME}} {{_OK}} {{A1_B}}";
        assert_eq!(extractor.extract_from_text(text), names(&["A1_B", "_OK"]));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = PlaceholderExtractor::shared();
        let text = "{{B}} {{A}} {{C}}";
        assert_eq!(extractor.extract_from_text(text), extractor.extract_from_text(text));
    }

    #[test]
    fn test_csv_file_extraction() {
        let extractor = PlaceholderExtractor::new();
        let csv = "nome,cpf\n{{NOME}},{{CPF}}\n";
        let found = extractor.extract_from_file(csv.as_bytes(), Some("text/csv"), Some("a.csv"));
        assert_eq!(found, names(&["CPF", "NOME"]));
    }

    #[test]
    fn test_pdf_yields_empty_set() {
        let extractor = PlaceholderExtractor::new();
        let found = extractor
            .try_extract_from_file(b"%PDF-1.4 {{NOME}}", Some("application/pdf"), None)
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_corrupt_docx_degrades_to_empty() {
        let extractor = PlaceholderExtractor::new();
        let bytes = b"definitely not a zip archive";
        assert!(extractor
            .extract_from_file(bytes, None, Some("contrato.docx"))
            .is_empty());
        let err = extractor
            .try_extract_from_file(bytes, None, Some("contrato.docx"))
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Container { format: DocumentFormat::WordProcessor, .. }
        ));
    }

    #[test]
    fn test_unrecognized_format() {
        let extractor = PlaceholderExtractor::new();
        let err = extractor
            .try_extract_from_file(b"GIF89a", Some("image/gif"), Some("x.gif"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unrecognized { .. }));
    }
}
