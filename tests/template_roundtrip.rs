//! Integration tests for placeholder extraction and template filling
//!
//! Each container type is filled with values for every placeholder; the
//! output must then contain no placeholders and keep its structure.

use std::collections::{BTreeMap, BTreeSet};

use docforge::format::{DOCX_MIME, XLSX_MIME};
use docforge::ooxml::{Package, PackageWriter};
use docforge::template::visible_text;
use docforge::{
    extract_placeholders, fill, DocumentFormat, PlaceholderExtractor, RenderError, Template,
};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Placeholders left in a filled document
fn remaining(bytes: &[u8], format: DocumentFormat) -> BTreeSet<String> {
    let text = visible_text(bytes, format)
        .expect("Should read output")
        .unwrap_or_default();
    PlaceholderExtractor::shared().extract_from_text(&text)
}

fn contract_docx() -> Vec<u8> {
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Contrato</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Contratante: {{</w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t>NOME</w:t></w:r><w:proofErr w:type="spellEnd"/><w:r><w:t>}}, CPF {{CPF}}.</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{CPF}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:body></w:document>"#;
    let footer = r#"<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>Emitido em {{DATA}}</w:t></w:r></w:p></w:ftr>"#;

    let mut writer = PackageWriter::new();
    writer.add("[Content_Types].xml", b"<Types/>").unwrap();
    writer.add("word/document.xml", document.as_bytes()).unwrap();
    writer.add("word/footer1.xml", footer.as_bytes()).unwrap();
    writer.finish().unwrap()
}

fn paragraph_count(bytes: &[u8]) -> usize {
    visible_text(bytes, DocumentFormat::WordProcessor)
        .unwrap()
        .unwrap()
        .lines()
        .count()
}

#[test]
fn test_text_fill_scenario() {
    let template = Template::text("Olá {{NOME}}, seu CPF é {{CPF}}.");
    assert_eq!(template.placeholders, names(&["CPF", "NOME"]));

    let out = fill(&template, &data(&[("NOME", "Ana"), ("CPF", "12345678900")])).unwrap();
    assert_eq!(
        String::from_utf8(out.bytes).unwrap(),
        "Olá Ana, seu CPF é 12345678900."
    );
    assert_eq!(out.file_name, "template_filled.txt");
}

#[test]
fn test_csv_round_trip_keeps_grid() {
    let csv = "nome;cpf;obs\n{{NOME}};{{CPF}};\"a; b\"\n";
    let template = Template::file(csv.as_bytes().to_vec(), None, Some("clientes.csv".into()));
    assert_eq!(template.placeholders, names(&["CPF", "NOME"]));

    let out = fill(&template, &data(&[("NOME", "Ana"), ("CPF", "1")])).unwrap();
    assert_eq!(out.mime_type, "text/csv");
    assert!(remaining(&out.bytes, DocumentFormat::DelimitedText).is_empty());

    let filled = String::from_utf8(out.bytes).unwrap();
    assert_eq!(filled.lines().count(), csv.lines().count());
    assert_eq!(filled.matches(';').count(), csv.matches(';').count());
}

#[test]
fn test_docx_extraction_sees_split_runs_and_footer() {
    let bytes = contract_docx();
    let found = extract_placeholders(&bytes, Some(DOCX_MIME), Some("contrato.docx"));
    assert_eq!(found, names(&["CPF", "DATA", "NOME"]));
}

#[test]
fn test_docx_round_trip() {
    let bytes = contract_docx();
    let template = Template::file(bytes.clone(), Some(DOCX_MIME.into()), Some("contrato.docx".into()));
    let out = fill(
        &template,
        &data(&[("NOME", "Ana"), ("CPF", "123"), ("DATA", "05/03/2024")]),
    )
    .unwrap();

    assert_eq!(out.file_name, "contrato_filled.docx");
    assert_eq!(out.mime_type, DOCX_MIME);
    assert!(remaining(&out.bytes, DocumentFormat::WordProcessor).is_empty());
    assert_eq!(paragraph_count(&out.bytes), paragraph_count(&bytes));

    let text = visible_text(&out.bytes, DocumentFormat::WordProcessor)
        .unwrap()
        .unwrap();
    assert_eq!(
        text,
        "Contrato\nContratante: Ana, CPF 123.\n123\nEmitido em 05/03/2024"
    );

    let mut package = Package::open(&out.bytes).unwrap();
    assert_eq!(
        package.part_names(),
        vec!["[Content_Types].xml", "word/document.xml", "word/footer1.xml"]
    );
    let document = String::from_utf8(package.require("word/document.xml").unwrap()).unwrap();
    assert!(document.contains(r#"<w:proofErr w:type="spellStart"/>"#));
    assert!(document.contains("<w:tbl>"));
}

#[test]
fn test_docx_missing_value_renders_empty() {
    let template = Template::file(contract_docx(), None, Some("contrato.docx".into()));
    let out = fill(&template, &data(&[("NOME", "Ana")])).unwrap();
    let text = visible_text(&out.bytes, DocumentFormat::WordProcessor)
        .unwrap()
        .unwrap();
    assert!(text.contains("Contratante: Ana, CPF ."));
    assert!(text.ends_with("Emitido em "));
}

#[test]
fn test_docx_unbalanced_tag_is_render_failure() {
    let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Olá {{NOME</w:t></w:r></w:p></w:body></w:document>"#;
    let mut writer = PackageWriter::new();
    writer.add("word/document.xml", document.as_bytes()).unwrap();
    let template = Template::file(writer.finish().unwrap(), None, Some("x.docx".into()));

    let err = fill(&template, &data(&[("NOME", "Ana")])).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Render { format: DocumentFormat::WordProcessor, .. }
    ));
    assert!(err.to_string().contains("unclosed tag"));
}

fn two_sheet_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let first = workbook.add_worksheet();
    first.write_string(0, 0, "{{NOME}}").unwrap();
    first.write_string(0, 1, "fixo").unwrap();
    first.write_number(1, 0, 7.5).unwrap();
    let second = workbook.add_worksheet();
    second.write_string(1, 1, "{{DATA}}").unwrap();
    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_xlsx_extraction_scenario() {
    let found = extract_placeholders(&two_sheet_workbook(), Some(XLSX_MIME), Some("planilha.xlsx"));
    assert_eq!(found, names(&["DATA", "NOME"]));
}

#[test]
fn test_xlsx_round_trip() {
    let bytes = two_sheet_workbook();
    let template = Template::file(bytes, Some(XLSX_MIME.into()), Some("planilha.xlsx".into()));
    let out = fill(&template, &data(&[("NOME", "Ana"), ("DATA", "hoje")])).unwrap();
    assert_eq!(out.file_name, "planilha_filled.xlsx");
    assert!(remaining(&out.bytes, DocumentFormat::Spreadsheet).is_empty());

    let mut cells: Vec<String> = visible_text(&out.bytes, DocumentFormat::Spreadsheet)
        .unwrap()
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    cells.sort();
    assert_eq!(cells, vec!["Ana", "fixo", "hoje"]);
}

#[test]
fn test_pdf_fill_is_unsupported() {
    let template = Template::file(b"%PDF-1.4".to_vec(), Some("application/pdf".into()), None);
    assert!(template.placeholders.is_empty());
    let err = fill(&template, &data(&[("NOME", "Ana")])).unwrap_err();
    assert!(matches!(err, RenderError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("cannot be auto-filled"));
}

#[test]
fn test_corrupt_container_has_no_placeholders() {
    let found = extract_placeholders(b"PK\x03\x04broken", Some(XLSX_MIME), None);
    assert!(found.is_empty());
    let strict = PlaceholderExtractor::shared().try_extract_from_file(b"PK\x03\x04broken", Some(XLSX_MIME), None);
    assert!(strict.is_err());
}
