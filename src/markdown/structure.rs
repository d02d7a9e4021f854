//! Flattening a semantic document into `[index, category, content]` rows
//!
//! Rows are grouped by the nearest preceding heading, not by nesting depth,
//! and the index counter runs across the whole document without resetting
//! at section boundaries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::inline::strip_inline;
use super::line::{classify, Line};
use crate::config::RenderConfig;

/// One flattened row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredRow {
    pub index: String,
    pub category: String,
    pub content: String,
}

impl StructuredRow {
    pub fn new(
        index: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            category: category.into(),
            content: content.into(),
        }
    }

    /// The row as its three cells, in column order
    pub fn cells(&self) -> [&str; 3] {
        [&self.index, &self.category, &self.content]
    }
}

/// Header row plus data rows, ready for CSV or spreadsheet output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredTable {
    pub headers: [String; 3],
    pub rows: Vec<StructuredRow>,
}

/// Single-pass, line-oriented flattener
pub struct MarkdownStructureParser<'a> {
    config: &'a RenderConfig,
}

impl<'a> MarkdownStructureParser<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Flatten `body` into rows, starting under the `title` category
    ///
    /// When `generated_at` is given, a trailing metadata row carries the
    /// formatted timestamp.
    pub fn parse(
        &self,
        body: &str,
        title: &str,
        generated_at: Option<DateTime<Utc>>,
    ) -> StructuredTable {
        let labels = &self.config.labels;
        let mut category = title.to_string();
        let mut counter = 1usize;
        let mut rows = Vec::new();

        for raw in body.lines() {
            let content = match classify(raw) {
                Line::Blank | Line::Rule => continue,
                Line::Heading { text, .. } => {
                    if !text.is_empty() {
                        category = strip_inline(text);
                    }
                    continue;
                }
                Line::Bullet { text: "", .. } | Line::Numbered { text: "", .. } => continue,
                Line::Bullet { text, .. } | Line::Numbered { text, .. } => strip_inline(text),
                Line::Text(text) => {
                    if self.is_metadata_line(text) {
                        continue;
                    }
                    strip_inline(text)
                }
            };
            rows.push(StructuredRow::new(counter.to_string(), category.clone(), content));
            counter += 1;
        }

        if let Some(at) = generated_at {
            let stamp = self.config.timestamp.display(at);
            rows.push(StructuredRow::new("", labels.metadata_category.clone(), stamp));
        }

        StructuredTable {
            headers: labels.columns.clone(),
            rows,
        }
    }

    /// The configured generated-at label followed by `:`, possibly wrapped in
    /// emphasis markers
    fn is_metadata_line(&self, text: &str) -> bool {
        let label = self.config.labels.generated_at.trim().to_lowercase();
        if label.is_empty() {
            return false;
        }
        let line = strip_inline(text)
            .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
            .to_lowercase();
        line.strip_prefix(&label)
            .is_some_and(|rest| rest.trim_start().starts_with(':'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn parse(body: &str, title: &str) -> StructuredTable {
        let config = RenderConfig::default();
        MarkdownStructureParser::new(&config).parse(body, title, None)
    }

    #[test]
    fn test_rules_grouped_under_heading() {
        let table = parse("# Regras\n- Regra 1\n- Regra 2", "Doc");
        assert_eq!(
            table.rows,
            vec![
                StructuredRow::new("1", "Regras", "Regra 1"),
                StructuredRow::new("2", "Regras", "Regra 2"),
            ]
        );
    }

    #[test]
    fn test_title_is_initial_category() {
        let table = parse("Intro line\n\n## Next\n1. **first**", "Ata");
        assert_eq!(
            table.rows,
            vec![
                StructuredRow::new("1", "Ata", "Intro line"),
                StructuredRow::new("2", "Next", "first"),
            ]
        );
    }

    #[test]
    fn test_counter_does_not_reset_per_section() {
        let table = parse("# A\n- a1\n# B\n- b1\n- b2", "T");
        let indexes: Vec<&str> = table.rows.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(indexes, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_rules_blanks_and_metadata_dropped() {
        let body = "# S\n\n---\n*Generated at: 2026-01-01 10:00*\ntext\n* * *\n";
        let table = parse(body, "T");
        assert_eq!(table.rows, vec![StructuredRow::new("1", "S", "text")]);
    }

    #[test]
    fn test_lines_sharing_label_prefix_are_content() {
        let body = "# Ata\nGenerated attendance list was shared\n- Generated at least three options\n**Generated at:** 2026-01-01";
        let table = parse(body, "T");
        assert_eq!(
            table.rows,
            vec![
                StructuredRow::new("1", "Ata", "Generated attendance list was shared"),
                StructuredRow::new("2", "Ata", "Generated at least three options"),
            ]
        );
    }

    #[test]
    fn test_configured_label_marks_metadata() {
        let config = RenderConfig::default().with_generated_label("Gerado em");
        let table = MarkdownStructureParser::new(&config).parse(
            "*Gerado em : 01/01/2026*\nGerado em breve\nGenerated at: kept",
            "T",
            None,
        );
        let contents: Vec<&str> = table.rows.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["Gerado em breve", "Generated at: kept"]);
    }

    #[test]
    fn test_bare_markers_emit_no_rows() {
        let table = parse("# S\n- \n#\n1.\n- real", "T");
        assert_eq!(table.rows, vec![StructuredRow::new("1", "S", "real")]);
    }

    #[test]
    fn test_heading_markup_stripped() {
        let table = parse("## **Decisões** `v2`\n- ok", "T");
        assert_eq!(table.rows[0].category, "Decisões v2");
    }

    #[test]
    fn test_trailing_metadata_row() {
        let config = RenderConfig::default();
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 13, 7, 0).unwrap();
        let table = MarkdownStructureParser::new(&config).parse("- a", "T", Some(at));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], StructuredRow::new("", "Metadata", "2026-05-04 13:07"));
        assert_eq!(table.headers, ["#", "Section", "Content"].map(String::from));
    }

    #[test]
    fn test_row_count_matches_items_and_text() {
        let body = "# H\n- a\n- b\n1. c\nplain\n\n### H3\n---\nmore plain";
        let table = parse(body, "T");
        assert_eq!(table.rows.len(), 5);
    }
}
