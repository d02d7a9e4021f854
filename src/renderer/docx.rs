//! Word-processor output
//!
//! Builds a minimal WordprocessingML package: one document part, a style
//! part defining the heading styles and a numbering part with one bullet and
//! one decimal definition. All numbered items share the decimal definition.

use quick_xml::escape::escape;

use crate::config::RenderConfig;
use crate::document::SemanticDocument;
use crate::error::RenderError;
use crate::format::DocumentFormat;
use crate::markdown::{classify, strip_inline, Line};
use crate::ooxml::{PackageError, PackageWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// `numId` of the bullet list definition
const BULLET_LIST: u32 = 1;
/// `numId` of the decimal list definition
const NUMBERED_LIST: u32 = 2;
/// Deepest list level emitted
const MAX_LIST_LEVEL: usize = 2;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

/// Which list definition an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// Build a document body paragraph by paragraph
#[derive(Debug, Default)]
pub struct DocxBuilder {
    paragraphs: Vec<String>,
}

impl DocxBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a heading; levels beyond 3 use the level 3 style
    pub fn add_heading(&mut self, level: usize, text: &str) {
        let style = format!("Heading{}", level.clamp(1, 3));
        self.paragraphs.push(format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr>{}</w:p>"#,
            style,
            run(text, "")
        ));
    }

    /// Add an italic, centered line
    pub fn add_caption(&mut self, text: &str) {
        self.paragraphs.push(format!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>{}</w:p>"#,
            run(text, "<w:rPr><w:i/></w:rPr>")
        ));
    }

    pub fn add_paragraph(&mut self, text: &str) {
        self.paragraphs.push(format!("<w:p>{}</w:p>", run(text, "")));
    }

    pub fn add_blank(&mut self) {
        self.paragraphs.push("<w:p/>".to_string());
    }

    /// Add a list item at `level` (0 is top level)
    pub fn add_list_item(&mut self, kind: ListKind, level: usize, text: &str) {
        let num_id = match kind {
            ListKind::Bullet => BULLET_LIST,
            ListKind::Numbered => NUMBERED_LIST,
        };
        self.paragraphs.push(format!(
            r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr></w:pPr>{}</w:p>"#,
            level.min(MAX_LIST_LEVEL),
            num_id,
            run(text, "")
        ));
    }

    /// The `word/document.xml` part
    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="709" w:footer="709" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            self.paragraphs.concat()
        )
    }

    /// Serialize the whole package
    pub fn finish(self) -> Result<Vec<u8>, PackageError> {
        let mut package = PackageWriter::new();
        package.add("[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
        package.add("_rels/.rels", PACKAGE_RELS.as_bytes())?;
        package.add("word/document.xml", self.document_xml().as_bytes())?;
        package.add("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes())?;
        package.add("word/styles.xml", styles_xml().as_bytes())?;
        package.add("word/numbering.xml", numbering_xml().as_bytes())?;
        package.finish()
    }
}

fn run(text: &str, properties: &str) -> String {
    format!(
        r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        properties,
        escape(text)
    )
}

fn styles_xml() -> String {
    let headings: String = [(1, 32), (2, 28), (3, 24)]
        .iter()
        .map(|(level, size)| {
            format!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr></w:style>"#,
                level - 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/><w:rPr><w:sz w:val="22"/></w:rPr></w:style>{headings}<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720"/></w:pPr></w:style></w:styles>"#
    )
}

fn numbering_xml() -> String {
    let levels = |format: &str, text: &dyn Fn(usize) -> String| -> String {
        (0..=MAX_LIST_LEVEL)
            .map(|level| {
                format!(
                    r#"<w:lvl w:ilvl="{level}"><w:start w:val="1"/><w:numFmt w:val="{format}"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr></w:lvl>"#,
                    text(level),
                    720 * (level + 1)
                )
            })
            .collect()
    };
    let bullets = levels("bullet", &|_| "\u{2022}".to_string());
    let decimals = levels("decimal", &|level| format!("%{}.", level + 1));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="{W_NS}"><w:abstractNum w:abstractNumId="0">{bullets}</w:abstractNum><w:abstractNum w:abstractNumId="1">{decimals}</w:abstractNum><w:num w:numId="{BULLET_LIST}"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="{NUMBERED_LIST}"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#
    )
}

/// Title heading, centered generated-at caption, then one paragraph per body line
pub fn render_docx(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut builder = DocxBuilder::new();
    builder.add_heading(1, &doc.title);
    builder.add_caption(&format!(
        "{}: {}",
        config.labels.generated_at,
        config.timestamp.display(doc.timestamp())
    ));
    builder.add_blank();

    for raw in doc.body.lines() {
        match classify(raw) {
            Line::Blank | Line::Rule => {}
            Line::Heading { level, text } => builder.add_heading(level, &strip_inline(text)),
            Line::Bullet { indent, text } => {
                builder.add_list_item(ListKind::Bullet, indent / 2, &strip_inline(text))
            }
            Line::Numbered { indent, text, .. } => {
                builder.add_list_item(ListKind::Numbered, indent / 2, &strip_inline(text))
            }
            Line::Text(text) => builder.add_paragraph(&strip_inline(text)),
        }
    }

    builder
        .finish()
        .map_err(|e| RenderError::render(DocumentFormat::WordProcessor, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::{Package, UnitSpec, XmlPart};
    use crate::template::visible_text;

    #[test]
    fn test_builder_paragraph_kinds() {
        let mut builder = DocxBuilder::new();
        builder.add_heading(5, "Fundo");
        builder.add_list_item(ListKind::Numbered, 4, "a < b");
        let xml = builder.document_xml();
        assert!(xml.contains(r#"<w:pStyle w:val="Heading3"/>"#));
        assert!(xml.contains(r#"<w:ilvl w:val="2"/><w:numId w:val="2"/>"#));
        assert!(xml.contains("a &lt; b"));
    }

    #[test]
    fn test_render_docx_visible_text() {
        let config = RenderConfig::default();
        let doc = SemanticDocument::new("Ata", "# Pauta\n- **Item** um\n1. Primeiro\n---\nTexto `livre`");
        let bytes = render_docx(&doc, &config).unwrap();
        let text = visible_text(&bytes, DocumentFormat::WordProcessor).unwrap().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Ata");
        assert!(lines[1].starts_with("Generated at: "));
        assert_eq!(&lines[2..], &["", "Pauta", "Item um", "Primeiro", "Texto livre"]);
    }

    #[test]
    fn test_every_part_is_well_formed() {
        let config = RenderConfig::default();
        let bytes = render_docx(&SemanticDocument::new("T", "- x\n2. y"), &config).unwrap();
        let mut package = Package::open(&bytes).unwrap();
        for name in package.part_names() {
            let xml = package.require(&name).unwrap();
            XmlPart::parse(&xml).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
        let numbering = XmlPart::parse(&package.require("word/numbering.xml").unwrap()).unwrap();
        let spec = UnitSpec {
            unit: b"abstractNum",
            text: b"t",
            skip: &[],
        };
        assert_eq!(numbering.units(spec).len(), 2);
    }
}
