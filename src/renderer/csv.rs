//! Delimited text output

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::config::RenderConfig;
use crate::document::SemanticDocument;
use crate::error::RenderError;
use crate::format::DocumentFormat;
use crate::markdown::MarkdownStructureParser;

/// Spreadsheet applications need the byte-order mark to detect UTF-8
const BOM: &str = "\u{FEFF}";

/// The structured table as CSV, every field quoted
pub fn render_csv(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let failed = |e: ::csv::Error| RenderError::render(DocumentFormat::DelimitedText, e);
    let table = MarkdownStructureParser::new(config).parse(&doc.body, &doc.title, doc.generated_at);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BOM.as_bytes().to_vec());
    writer.write_record(&table.headers).map_err(failed)?;
    for row in &table.rows {
        writer.write_record(row.cells()).map_err(failed)?;
    }
    writer
        .into_inner()
        .map_err(|e| RenderError::render(DocumentFormat::DelimitedText, e.error()))
}
