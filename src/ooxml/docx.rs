//! Word-processor templates
//!
//! Visible text is the paragraph text of the main document, headers and
//! footers, one line per paragraph. Filling runs over the same paragraphs:
//! tags are matched on the joined paragraph text, so a tag Word split across
//! several runs (spell checking, partial formatting) is still found, and the
//! replacement is written back into the run the tag started in.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Package, PackageError, UnitSpec, XmlPart};
use crate::error::{ExtractionError, RenderError};
use crate::format::DocumentFormat;
use crate::template::substitute::Match;

const MAIN_PART: &str = "word/document.xml";

const PARAGRAPHS: UnitSpec<'static> = UnitSpec {
    unit: b"p",
    text: b"t",
    skip: &[],
};

/// Paragraph text of every text-bearing part, joined with newlines
pub fn visible_text(bytes: &[u8]) -> Result<Option<String>, ExtractionError> {
    read_paragraphs(bytes)
        .map(|paragraphs| Some(paragraphs.join("\n")))
        .map_err(|e| ExtractionError::container(DocumentFormat::WordProcessor, e))
}

/// Replace every `{{TAG}}` in the package with its value from `data`
///
/// Tags with no value render empty. A paragraph whose delimiters do not pair
/// up fails the whole fill.
pub fn fill(
    format: DocumentFormat,
    bytes: &[u8],
    data: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    fill_package(bytes, data).map_err(|e| RenderError::render(format, e))
}

fn read_paragraphs(bytes: &[u8]) -> Result<Vec<String>, PackageError> {
    let mut package = Package::open(bytes)?;
    let mut paragraphs = Vec::new();
    for name in text_parts(&package) {
        if let Some(xml) = read_part(&mut package, &name)? {
            paragraphs.extend(XmlPart::parse(&xml)?.unit_strings(PARAGRAPHS)?);
        }
    }
    Ok(paragraphs)
}

fn fill_package(bytes: &[u8], data: &BTreeMap<String, String>) -> Result<Vec<u8>, PackageError> {
    let mut package = Package::open(bytes)?;
    let mut edits = BTreeMap::new();
    for name in text_parts(&package) {
        let Some(xml) = read_part(&mut package, &name)? else {
            continue;
        };
        let mut part = XmlPart::parse(&xml)?;
        let changed = part.fill_units(PARAGRAPHS, |text| scan_tags(text, data))?;
        if changed > 0 {
            debug!(part = %name, runs = changed, "filled part");
            edits.insert(name, part.to_bytes()?);
        }
    }
    package.rewrite(&edits)
}

/// The main document first, then headers and footers in name order
fn text_parts(package: &Package<'_>) -> Vec<String> {
    let mut extra: Vec<String> = package
        .part_names()
        .into_iter()
        .filter(|name| {
            (name.starts_with("word/header") || name.starts_with("word/footer"))
                && name.ends_with(".xml")
        })
        .collect();
    extra.sort();
    let mut parts = vec![MAIN_PART.to_string()];
    parts.extend(extra);
    parts
}

fn read_part(package: &mut Package<'_>, name: &str) -> Result<Option<Vec<u8>>, PackageError> {
    if name == MAIN_PART {
        package.require(name).map(Some)
    } else {
        package.read(name)
    }
}

/// Every tag in one paragraph, each `{{` paired with the next `}}`
fn scan_tags<'d>(
    text: &str,
    data: &'d BTreeMap<String, String>,
) -> Result<Vec<Match<'d>>, PackageError> {
    let mut matches = Vec::new();
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let open = rest.find("{{").map(|o| pos + o);
        let close = rest.find("}}").map(|c| pos + c);
        let start = match (open, close) {
            (None, None) => break,
            (None, Some(_)) => return Err(tag_error("unopened", text)),
            (Some(o), Some(c)) if c < o => return Err(tag_error("unopened", text)),
            (Some(o), _) => o,
        };

        let inner = start + 2;
        let Some(end) = text[inner..].find("}}").map(|c| inner + c) else {
            return Err(tag_error("unclosed", text));
        };
        if text[inner..end].contains("{{") {
            return Err(tag_error("unclosed", text));
        }

        let key = &text[inner..end];
        let value = match data.get(key) {
            Some(value) => value.as_str(),
            None => {
                debug!(tag = key, "tag has no value, rendering empty");
                ""
            }
        };
        matches.push(Match {
            start,
            end: end + 2,
            value,
        });
        pos = end + 2;
    }
    Ok(matches)
}

fn tag_error(kind: &str, paragraph: &str) -> PackageError {
    PackageError::Template(format!("{} tag in paragraph \"{}\"", kind, paragraph))
}
