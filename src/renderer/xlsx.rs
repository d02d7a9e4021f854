//! Spreadsheet output

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::config::RenderConfig;
use crate::document::SemanticDocument;
use crate::error::RenderError;
use crate::format::DocumentFormat;
use crate::markdown::MarkdownStructureParser;

/// Excel's limit on worksheet name length
const MAX_SHEET_NAME: usize = 31;

/// The structured table as a single worksheet with a bold header row
pub fn render_xlsx(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    build_workbook(doc, config).map_err(|e| RenderError::render(DocumentFormat::Spreadsheet, e))
}

fn build_workbook(doc: &SemanticDocument, config: &RenderConfig) -> Result<Vec<u8>, XlsxError> {
    let table = MarkdownStructureParser::new(config).parse(&doc.body, &doc.title, doc.generated_at);
    let header = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(&doc.title, &config.labels.fallback_title))?;

    for (col, name) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    for (row, cells) in table.rows.iter().enumerate() {
        for (col, cell) in cells.cells().into_iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }

    let widths = &config.spreadsheet;
    sheet.set_column_width(0, widths.index_width)?;
    sheet.set_column_width(1, widths.category_width)?;
    sheet.set_column_width(2, widths.content_width)?;

    workbook.save_to_buffer()
}

/// A worksheet name Excel accepts: no `[]:*?/\`, no edge apostrophes, at most 31 chars
fn sheet_name(title: &str, fallback: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') && !c.is_control())
        .collect();
    let name: String = cleaned
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        fallback.chars().take(MAX_SHEET_NAME).collect()
    } else {
        name
    }
}
