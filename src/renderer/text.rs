//! Markdown and plain text output

use crate::config::RenderConfig;
use crate::document::SemanticDocument;
use crate::error::RenderError;
use crate::markdown::{classify, strip_inline, Line};

/// Title heading and an emphasized generated-at line around the untouched body
pub fn render_markdown(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut out = format!(
        "# {}\n\n*{}: {}*\n\n{}",
        doc.title,
        config.labels.generated_at,
        config.timestamp.display(doc.timestamp()),
        doc.body
    );
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Title and generated-at as plain lines, then the body without markup
pub fn render_plain(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut out = format!(
        "{}\n{}: {}\n\n",
        doc.title,
        config.labels.generated_at,
        config.timestamp.display(doc.timestamp())
    );
    for raw in doc.body.lines() {
        out.push_str(&plain_line(raw, &config.labels.bullet));
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// One body line with heading markers, inline markup and bullet markers flattened
pub(crate) fn plain_line(raw: &str, bullet: &str) -> String {
    match classify(raw) {
        Line::Blank => String::new(),
        Line::Rule => raw.trim().to_string(),
        Line::Heading { text, .. } => strip_inline(text),
        Line::Bullet { indent, text } => {
            format!("{}{} {}", " ".repeat(indent), bullet, strip_inline(text))
        }
        Line::Numbered {
            indent,
            number,
            text,
        } => format!("{}{}. {}", " ".repeat(indent), number, strip_inline(text)),
        Line::Text(text) => strip_inline(text),
    }
}
