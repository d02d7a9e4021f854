//! Line-level classification of semantic documents
//!
//! Only the markup subset produced by the content generator is recognized:
//! ATX headings, `-`/`*` bullets, `1.`/`1)` numbered items and horizontal
//! rules. Everything else is a plain text line.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*))?$").expect("heading pattern"));
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*](?:[ \t]+(.*))?$").expect("bullet pattern"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d+)[.)](?:[ \t]+(.*))?$").expect("numbered pattern"));

/// One classified source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Rule,
    Heading {
        level: usize,
        text: &'a str,
    },
    Bullet {
        indent: usize,
        text: &'a str,
    },
    Numbered {
        indent: usize,
        number: &'a str,
        text: &'a str,
    },
    Text(&'a str),
}

/// Classify one line of a semantic document
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return Line::Blank;
    }
    // Rules first: `* * *` would otherwise read as a bullet
    if is_rule(line) {
        return Line::Rule;
    }
    // A bare marker (`#`, `-`, `1.`) is its own kind with empty text
    if let Some(caps) = HEADING.captures(line) {
        if let Some(hashes) = caps.get(1) {
            return Line::Heading {
                level: hashes.as_str().len(),
                text: capture_text(&caps, 2),
            };
        }
    }
    if let Some(caps) = BULLET.captures(line) {
        if let Some(indent) = caps.get(1) {
            return Line::Bullet {
                indent: indent.as_str().len(),
                text: capture_text(&caps, 2),
            };
        }
    }
    if let Some(caps) = NUMBERED.captures(line) {
        if let (Some(indent), Some(number)) = (caps.get(1), caps.get(2)) {
            return Line::Numbered {
                indent: indent.as_str().len(),
                number: number.as_str(),
                text: capture_text(&caps, 3),
            };
        }
    }
    Line::Text(line.trim())
}

fn capture_text<'a>(caps: &regex::Captures<'a>, group: usize) -> &'a str {
    caps.get(group).map_or("", |m| m.as_str().trim())
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces
fn is_rule(line: &str) -> bool {
    let compact: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.first() {
        Some(&first @ ('-' | '*' | '_')) => {
            compact.len() >= 3 && compact.iter().all(|&c| c == first)
        }
        _ => false,
    }
}
