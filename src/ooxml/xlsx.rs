//! Spreadsheet templates
//!
//! Cell text lives either in the shared string table or inline in a
//! worksheet. Extraction reads every used cell through calamine; filling
//! edits the string XML directly so styles, formulas and sheet layout are
//! carried over byte for byte.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use tracing::debug;

use super::{Package, PackageError, UnitSpec, XmlPart};
use crate::error::{ExtractionError, RenderError};
use crate::format::DocumentFormat;
use crate::template::substitute::find_matches;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

const PHONETIC: &[&[u8]] = &[b"rPh"];

const SHARED_ITEMS: UnitSpec<'static> = UnitSpec {
    unit: b"si",
    text: b"t",
    skip: PHONETIC,
};

const INLINE_STRINGS: UnitSpec<'static> = UnitSpec {
    unit: b"is",
    text: b"t",
    skip: PHONETIC,
};

/// String values of every used cell of every sheet, one per line
pub fn visible_text(bytes: &[u8]) -> Result<Option<String>, ExtractionError> {
    let container = |e: calamine::XlsxError| ExtractionError::container(DocumentFormat::Spreadsheet, e);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(container)?;

    let mut cells = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet).map_err(container)?;
        cells.extend(range.used_cells().filter_map(|(_, _, cell)| match cell {
            Data::String(text) => Some(text.clone()),
            _ => None,
        }));
    }
    Ok(Some(cells.join("\n")))
}

/// Replace `{{KEY}}` in every string cell for each key in `data`
///
/// Only string items whose text changes are rewritten.
pub fn fill(
    format: DocumentFormat,
    bytes: &[u8],
    data: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    fill_package(bytes, data).map_err(|e| RenderError::render(format, e))
}

fn fill_package(bytes: &[u8], data: &BTreeMap<String, String>) -> Result<Vec<u8>, PackageError> {
    let mut package = Package::open(bytes)?;
    let mut worksheets: Vec<String> = package
        .part_names()
        .into_iter()
        .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        .collect();
    worksheets.sort();

    let mut edits = BTreeMap::new();
    let mut cells = 0;
    let parts = std::iter::once((SHARED_STRINGS.to_string(), SHARED_ITEMS))
        .chain(worksheets.into_iter().map(|name| (name, INLINE_STRINGS)));
    for (name, spec) in parts {
        let Some(xml) = package.read(&name)? else {
            continue;
        };
        let mut part = XmlPart::parse(&xml)?;
        let changed = part.fill_units(spec, |text| Ok(find_matches(text, data)))?;
        if changed > 0 {
            cells += changed;
            edits.insert(name, part.to_bytes()?);
        }
    }
    debug!(runs = cells, parts = edits.len(), "filled spreadsheet template");
    package.rewrite(&edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::PackageWriter;
    use rust_xlsxwriter::{Format, Workbook};

    fn two_sheets() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("Dados").unwrap();
        first.write_string(0, 0, "{{NOME}}").unwrap();
        first
            .write_string_with_format(0, 1, "Cliente: {{NOME}}", &Format::new().set_bold())
            .unwrap();
        first.write_number(1, 0, 42.0).unwrap();
        let second = workbook.add_worksheet();
        second.write_string(1, 1, "{{DATA}}").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cells(bytes: &[u8]) -> Vec<String> {
        let mut lines: Vec<String> = visible_text(bytes)
            .unwrap()
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    }

    #[test]
    fn test_visible_text_covers_every_sheet() {
        assert_eq!(
            cells(&two_sheets()),
            vec!["Cliente: {{NOME}}", "{{DATA}}", "{{NOME}}"]
        );
    }

    #[test]
    fn test_fill_rewrites_string_cells() {
        let filled = fill(
            DocumentFormat::Spreadsheet,
            &two_sheets(),
            &data(&[("NOME", "Ana & Cia"), ("DATA", "2024-01-02")]),
        )
        .unwrap();
        assert_eq!(cells(&filled), vec!["2024-01-02", "Ana & Cia", "Cliente: Ana & Cia"]);

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(filled.as_slice())).unwrap();
        assert_eq!(workbook.sheet_names().len(), 2);
        let range = workbook.worksheet_range("Dados").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(42.0)));
    }

    #[test]
    fn test_fill_leaves_unknown_markers() {
        let filled = fill(DocumentFormat::Spreadsheet, &two_sheets(), &data(&[("DATA", "x")])).unwrap();
        assert_eq!(cells(&filled), vec!["Cliente: {{NOME}}", "x", "{{NOME}}"]);
    }

    #[test]
    fn test_inline_strings_filled() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{A}}</t></is></c></row></sheetData></worksheet>"#;
        let mut writer = PackageWriter::new();
        writer.add("xl/worksheets/sheet1.xml", sheet.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap();

        let filled = fill(DocumentFormat::Spreadsheet, &bytes, &data(&[("A", "1")])).unwrap();
        let mut package = Package::open(&filled).unwrap();
        let xml = String::from_utf8(package.require("xl/worksheets/sheet1.xml").unwrap()).unwrap();
        assert!(xml.contains(r#"<t xml:space="preserve">1</t>"#));
    }

    #[test]
    fn test_corrupt_workbook() {
        let err = visible_text(b"not a workbook").unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Container { format: DocumentFormat::Spreadsheet, .. }
        ));
        assert!(fill(DocumentFormat::Spreadsheet, b"nope", &BTreeMap::new()).is_err());
    }
}
