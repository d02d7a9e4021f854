//! Filling templates with caller data

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::model::{Template, TemplateSource};
use super::substitute::substitute;
use crate::document::RenderedDocument;
use crate::error::RenderError;
use crate::format::DocumentFormat;

/// How to treat cached placeholders the caller supplied no value for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Missing values render as empty strings
    #[default]
    Lenient,
    /// Missing values fail the fill with [`RenderError::Validation`]
    Strict,
}

/// Produces filled copies of templates; the template itself is never mutated
#[derive(Debug, Clone, Default)]
pub struct TemplateFiller {
    mode: FillMode,
}

impl TemplateFiller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: FillMode) -> Self {
        self.mode = mode;
        self
    }

    /// Every cached placeholder mapped to its value (or `""`), plus any extra
    /// caller keys passed through as-is
    pub fn effective_data(
        &self,
        template: &Template,
        data: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, RenderError> {
        if self.mode == FillMode::Strict {
            let missing: Vec<String> = template
                .placeholders
                .iter()
                .filter(|name| !data.contains_key(*name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RenderError::Validation { missing });
            }
        }

        let mut effective: BTreeMap<String, String> = template
            .placeholders
            .iter()
            .map(|name| (name.clone(), data.get(name).cloned().unwrap_or_default()))
            .collect();
        for (key, value) in data {
            effective
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(effective)
    }

    /// Substitute `data` into `template`, producing a document of the same kind
    pub fn fill(
        &self,
        template: &Template,
        data: &BTreeMap<String, String>,
    ) -> Result<RenderedDocument, RenderError> {
        let effective = self.effective_data(template, data)?;

        match &template.source {
            TemplateSource::Text { text_content } => {
                debug!(keys = effective.len(), "filling text template");
                let filled = substitute(text_content, &effective);
                Ok(RenderedDocument::new(
                    filled.into_bytes(),
                    DocumentFormat::PlainText,
                    filled_file_name("template.txt"),
                ))
            }
            TemplateSource::File {
                file_bytes,
                mime_type,
                file_name,
            } => {
                let format = DocumentFormat::classify(mime_type.as_deref(), file_name.as_deref())
                    .ok_or_else(|| RenderError::Unrecognized {
                        mime_type: mime_type.clone(),
                        file_name: file_name.clone(),
                    })?;
                debug!(%format, keys = effective.len(), "filling file template");
                let bytes = (format.handlers().fill)(format, file_bytes, &effective)?;
                let name = match file_name {
                    Some(name) => filled_file_name(name),
                    None => filled_file_name(&format!("template.{}", format.extension())),
                };
                Ok(RenderedDocument::new(bytes, format, name))
            }
        }
    }
}

/// `ata.docx` becomes `ata_filled.docx`
pub fn filled_file_name(name: &str) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{}_filled.{}", stem, ext),
        _ => format!("{}_filled", name),
    }
}
