//! PDF output
//!
//! Pages are laid out top-down in the standard Helvetica fonts, so no font
//! program is embedded. Text is encoded as WinAnsi; glyph widths come from a
//! coarse Helvetica metric table that is only used for wrapping and centering.

use std::mem;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::text::plain_line;
use crate::config::{PdfConfig, RenderConfig};
use crate::document::SemanticDocument;
use crate::error::RenderError;
use crate::format::DocumentFormat;
use crate::markdown::{classify, strip_inline, Line};

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Extra indent per leading space of a list item, in points
const INDENT_STEP: f64 = 6.0;

/// Title, generated-at line and body of one document
pub fn render_pdf(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut pages = PageBuilder::new(&config.pdf);
    pages.write_document(doc, doc.timestamp(), config);
    pages.finish(&doc.title).map_err(failed)
}

/// A summary page followed by each item on a fresh page, in input order
pub fn render_bundle(
    title: &str,
    at: DateTime<Utc>,
    items: &[SemanticDocument],
    config: &RenderConfig,
) -> Result<Vec<u8>, RenderError> {
    let pdf = &config.pdf;
    let labels = &config.labels;
    let mut pages = PageBuilder::new(pdf);

    pages.centered(title, BOLD, pdf.title_size, false);
    pages.centered(
        &format!("{}: {}", labels.generated_at, config.timestamp.display(at)),
        REGULAR,
        pdf.meta_size,
        true,
    );
    pages.gap(pdf.body_size as f64);
    pages.paragraph(
        &format!("{}: {}", labels.summary_heading, items.len()),
        BOLD,
        pdf.heading_size,
        0.0,
    );
    for (number, item) in items.iter().enumerate() {
        pages.paragraph(&format!("{}. {}", number + 1, item.title), REGULAR, pdf.body_size, 0.0);
    }

    for item in items {
        pages.page_break();
        pages.write_document(item, item.generated_at.unwrap_or(at), config);
    }
    pages.finish(title).map_err(failed)
}

fn failed(err: lopdf::Error) -> RenderError {
    RenderError::render(DocumentFormat::PortableDocument, err)
}

/// Accumulates content stream operations page by page
struct PageBuilder<'c> {
    config: &'c PdfConfig,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    /// Baseline of the last written line
    y: f64,
}

impl<'c> PageBuilder<'c> {
    fn new(config: &'c PdfConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            ops: Vec::new(),
            y: (config.page_height - config.margin) as f64,
        }
    }

    fn usable_width(&self) -> f64 {
        (self.config.page_width - 2 * self.config.margin) as f64
    }

    /// Close the current page; a page with nothing on it is reused instead
    fn page_break(&mut self) {
        if self.ops.is_empty() {
            return;
        }
        self.pages.push(mem::take(&mut self.ops));
        self.y = (self.config.page_height - self.config.margin) as f64;
    }

    fn gap(&mut self, points: f64) {
        self.y -= points;
    }

    /// Move down one line, continuing on a new page when the margin is reached
    fn advance(&mut self, size: i64) -> f64 {
        let height = size as f64 * self.config.line_spacing;
        if self.y - height < self.config.margin as f64 {
            self.page_break();
        }
        self.y -= height;
        self.y
    }

    fn centered(&mut self, text: &str, font: &str, size: i64, muted: bool) {
        for line in wrap(text, size, self.usable_width()) {
            let y = self.advance(size);
            let x = (self.config.page_width as f64 - text_width(&line, size)) / 2.0;
            self.show(&line, font, size, x.max(self.config.margin as f64), y, muted);
        }
    }

    fn paragraph(&mut self, text: &str, font: &str, size: i64, indent: f64) {
        let x = self.config.margin as f64 + indent;
        for line in wrap(text, size, self.usable_width() - indent) {
            let y = self.advance(size);
            self.show(&line, font, size, x, y, false);
        }
    }

    fn show(&mut self, text: &str, font: &str, size: i64, x: f64, y: f64, muted: bool) {
        if muted {
            self.ops.push(Operation::new("q", vec![]));
            self.ops.push(Operation::new("g", vec![Object::Real(0.45)]));
        }
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops.push(Operation::new(
            "Td",
            vec![(x.round() as i64).into(), (y.round() as i64).into()],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
        if muted {
            self.ops.push(Operation::new("Q", vec![]));
        }
    }

    fn write_document(&mut self, doc: &SemanticDocument, at: DateTime<Utc>, config: &RenderConfig) {
        let pdf = self.config;
        let body = pdf.body_size;
        self.centered(&doc.title, BOLD, pdf.title_size, false);
        self.centered(
            &format!("{}: {}", config.labels.generated_at, config.timestamp.display(at)),
            REGULAR,
            pdf.meta_size,
            true,
        );
        self.gap(body as f64);

        for raw in doc.body.lines() {
            match classify(raw) {
                Line::Blank | Line::Rule => self.gap(body as f64 * 0.5),
                Line::Heading { text, .. } => {
                    self.gap(body as f64 * 0.5);
                    self.paragraph(&strip_inline(text), REGULAR, body, 0.0);
                }
                Line::Bullet { indent, .. } | Line::Numbered { indent, .. } => {
                    let item = plain_line(raw.trim_start(), &config.labels.bullet);
                    self.paragraph(&item, REGULAR, body, indent as f64 * INDENT_STEP);
                }
                Line::Text(text) => self.paragraph(&strip_inline(text), REGULAR, body, 0.0),
            }
        }
    }

    fn finish(mut self, title: &str) -> Result<Vec<u8>, lopdf::Error> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(mem::take(&mut self.ops));
        }
        let config = self.config;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular,
                BOLD => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), config.page_width.into(), config.page_height.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal("docforge"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        if config.compress {
            doc.compress();
        }
        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Greedy word wrap; words wider than a whole line are broken by character
fn wrap(text: &str, size: i64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() {
            if text_width(&format!("{} {}", current, word), size) <= max_width {
                current.push(' ');
                current.push_str(word);
                continue;
            }
            lines.push(mem::take(&mut current));
        }
        for c in word.chars() {
            if !current.is_empty() && text_width(&format!("{}{}", current, c), size) > max_width {
                lines.push(mem::take(&mut current));
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn text_width(text: &str, size: i64) -> f64 {
    let units: u32 = text.chars().map(glyph_width).sum();
    units as f64 * size as f64 / 1000.0
}

/// Approximate Helvetica advance widths, in thousandths of an em
fn glyph_width(c: char) -> u32 {
    match c {
        'i' | 'j' | 'l' => 222,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | 'f' | 't' | '[' | ']' => 278,
        '-' | '(' | ')' | 'r' | '`' => 333,
        '•' => 350,
        'm' => 833,
        'w' => 722,
        'M' => 833,
        'W' => 944,
        '0'..='9' => 556,
        c if c.is_uppercase() => 667,
        _ => 556,
    }
}

/// Encode `text` for a WinAnsiEncoding font; unmappable characters become `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> RenderConfig {
        RenderConfig::default().with_pdf_compression(false)
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(
            win_ansi("Olá • €中"),
            vec![b'O', b'l', 0xE1, b' ', 0x95, b' ', 0x80, b'?']
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "palavra ".repeat(40);
        let lines = wrap(&text, 11, 200.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| text_width(line, 11) <= 200.0));
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap(&"x".repeat(100), 10, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(100));
    }

    #[test]
    fn test_single_document() {
        let doc = SemanticDocument::new("Ata", "# Pauta\n- Item **um**\n\nTexto")
            .generated_at(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap());
        let pages = page_texts(&render_pdf(&doc, &config()).unwrap());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("(Ata) Tj"));
        assert!(pages[0].contains("(Generated at: 2024-03-05 14:07) Tj"));
        assert!(pages[0].contains("Item um) Tj"));

        let page = &pages[0];
        let heading = page.find("(Pauta) Tj").unwrap();
        let font = &page[page[..heading].rfind("/F").unwrap()..heading];
        assert!(font.starts_with("/F1 11 Tf"), "heading drawn with {font:?}");
        assert!(!page.contains("/F2 14 Tf"));
    }

    #[test]
    fn test_long_body_continues_on_new_pages() {
        let body = "linha\n".repeat(200);
        let doc = SemanticDocument::new("Longo", body);
        let pages = page_texts(&render_pdf(&doc, &config()).unwrap());
        assert!(pages.len() >= 3);
        assert!(pages.iter().all(|page| page.contains("(linha) Tj")));
    }

    #[test]
    fn test_compressed_output_loads() {
        let doc = SemanticDocument::new("T", "x");
        let bytes = render_pdf(&doc, &RenderConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }
}
