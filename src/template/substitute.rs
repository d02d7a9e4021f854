//! String substitution primitives shared by every filler
//!
//! Matching works on one logical string; [`redistribute`] maps the result
//! back onto the text runs that string was joined from, so containers that
//! split text across runs keep their run structure.

use std::collections::BTreeMap;

use crate::error::RenderError;
use crate::format::DocumentFormat;

/// One marker occurrence: byte range in the scanned text and its replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub start: usize,
    pub end: usize,
    pub value: &'a str,
}

/// Every `{{KEY}}` occurrence whose key is present in `data`, left to right
///
/// Equivalent to a global replace per key: markers cannot nest, so the
/// occurrences never overlap.
pub fn find_matches<'d>(text: &str, data: &'d BTreeMap<String, String>) -> Vec<Match<'d>> {
    let mut matches = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find("{{") {
        let start = pos + offset;
        let inner = start + 2;
        let Some(len) = text[inner..].find("}}") else {
            break;
        };
        if let Some(value) = data.get(&text[inner..inner + len]) {
            let end = inner + len + 2;
            matches.push(Match { start, end, value });
            pos = end;
        } else {
            pos = start + 1;
        }
    }
    matches
}

/// Replace every `{{KEY}}` for each key in `data`; other text is untouched
pub fn substitute(text: &str, data: &BTreeMap<String, String>) -> String {
    let matches = find_matches(text, data);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in &matches {
        out.push_str(&text[cursor..m.start]);
        out.push_str(m.value);
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Apply matches found on `segments.concat()` back onto each segment
///
/// A replacement lands in the segment where its marker starts; the rest of
/// the marker is removed from the following segments. Segments untouched by
/// any match come back unchanged.
pub fn redistribute(segments: &[String], matches: &[Match<'_>]) -> Vec<String> {
    let mut out = Vec::with_capacity(segments.len());
    let mut base = 0;
    for segment in segments {
        let end = base + segment.len();
        let mut text = String::with_capacity(segment.len());
        let mut cursor = base;
        for m in matches.iter().filter(|m| m.start < end && m.end > base) {
            if m.start >= base {
                text.push_str(&segment[cursor - base..m.start - base]);
                text.push_str(m.value);
            }
            cursor = m.end.min(end);
        }
        text.push_str(&segment[cursor - base..]);
        out.push(text);
        base = end;
    }
    out
}

/// Fill a UTF-8 text container (plain text, Markdown, CSV)
pub fn fill_utf8(
    format: DocumentFormat,
    bytes: &[u8],
    data: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    let text = std::str::from_utf8(bytes).map_err(|e| RenderError::render(format, e))?;
    Ok(substitute(text, data).into_bytes())
}
