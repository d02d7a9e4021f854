//! Render configuration
//!
//! Labels, timestamp formats, spreadsheet column widths and PDF page metrics
//! are all configurable through a TOML document. User documents are merged
//! over the embedded defaults, so any section or key may be omitted.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Default configuration, also used to fill in keys absent from user files
const DEFAULT_CONFIG: &str = r##"
[labels]
generated_at = "Generated at"
metadata_category = "Metadata"
columns = ["#", "Section", "Content"]
bullet = "•"
summary_heading = "Contents"
fallback_title = "document"

[timestamp]
display_format = "%Y-%m-%d %H:%M"
filename_format = "%Y-%m-%d_%H-%M"

[spreadsheet]
index_width = 8.0
category_width = 30.0
content_width = 90.0

[pdf]
page_width = 595
page_height = 842
margin = 56
title_size = 20
meta_size = 9
heading_size = 14
body_size = 11
line_spacing = 1.4
compress = true
"##;

/// Text that appears in rendered output
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Labels {
    /// Label of the generated-at line; lines starting with it are metadata
    pub generated_at: String,
    /// Category of the trailing timestamp row in tabular output
    pub metadata_category: String,
    /// The three fixed column names of tabular output
    pub columns: [String; 3],
    /// Glyph that replaces bullet markers in flattened output
    pub bullet: String,
    /// Heading of the bundle summary page
    pub summary_heading: String,
    /// File name stem used when a title sanitizes to nothing
    pub fallback_title: String,
}

/// chrono format strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampConfig {
    pub display_format: String,
    pub filename_format: String,
}

impl TimestampConfig {
    /// `at` rendered for generated-at lines
    pub fn display(&self, at: DateTime<Utc>) -> String {
        format_or_fallback(at, &self.display_format)
    }

    /// `at` rendered for file name suffixes
    pub fn file_suffix(&self, at: DateTime<Utc>) -> String {
        format_or_fallback(at, &self.filename_format)
    }
}

/// An invalid chrono format falls back to RFC 3339 instead of panicking
fn format_or_fallback(at: DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        warn!(format, "invalid timestamp format, using RFC 3339");
        return at.to_rfc3339();
    }
    out
}

/// Column widths of the rendered spreadsheet, in character units
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpreadsheetConfig {
    pub index_width: f64,
    pub category_width: f64,
    pub content_width: f64,
}

/// Page metrics for PDF output, in points
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PdfConfig {
    pub page_width: i64,
    pub page_height: i64,
    pub margin: i64,
    pub title_size: i64,
    pub meta_size: i64,
    pub heading_size: i64,
    pub body_size: i64,
    /// Line height as a multiple of the font size
    pub line_spacing: f64,
    /// Deflate page content streams
    pub compress: bool,
}

/// Configuration for every renderer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderConfig {
    pub labels: Labels,
    pub timestamp: TimestampConfig,
    pub spreadsheet: SpreadsheetConfig,
    pub pdf: PdfConfig,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = DEFAULT_CONFIG.parse()?;
        merge(&mut table, content.parse()?);
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Set the label of the generated-at line
    pub fn with_generated_label(mut self, label: impl Into<String>) -> Self {
        self.labels.generated_at = label.into();
        self
    }

    /// Set the chrono format used for generated-at lines
    pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp.display_format = format.into();
        self
    }

    /// Enable or disable PDF stream compression
    pub fn with_pdf_compression(mut self, compress: bool) -> Self {
        self.pdf.compress = compress;
        self
    }
}

/// Overlay `user` onto `base`, table by table
fn merge(base: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(overlay)) => {
                merge(existing, overlay)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("Default config should be valid TOML")
    }
}
