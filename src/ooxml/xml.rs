//! Event-level view of an XML part, addressing its text runs
//!
//! OOXML keeps visible text in leaf elements (`w:t` in documents, `t` in
//! shared strings) grouped into units (paragraphs, string items). A single
//! logical string may be split across several runs of one unit, so editing
//! works on the unit's joined text and writes the result back run by run.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::PackageError;
use crate::template::substitute::{redistribute, Match};

/// One text event inside a text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun {
    /// Index of the enclosing text element's start event
    start: usize,
    /// Index of the text event itself
    text: usize,
}

/// The runs making up one logical string, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextUnit {
    pub runs: Vec<TextRun>,
}

/// Which elements delimit units and which hold text
#[derive(Debug, Clone, Copy)]
pub struct UnitSpec<'s> {
    /// Local name of the unit element (`p`, `si`, `is`)
    pub unit: &'s [u8],
    /// Local name of the text element (`t`)
    pub text: &'s [u8],
    /// Elements whose text is not part of the unit (phonetic runs)
    pub skip: &'s [&'s [u8]],
}

impl UnitSpec<'_> {
    fn skips(&self, name: &[u8]) -> bool {
        self.skip.iter().any(|skipped| *skipped == name)
    }
}

/// A parsed XML part that can be edited and serialized back
pub struct XmlPart {
    events: Vec<Event<'static>>,
}

impl XmlPart {
    pub fn parse(xml: &[u8]) -> Result<Self, PackageError> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut events = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                event => events.push(event.into_owned()),
            }
            buf.clear();
        }
        Ok(Self { events })
    }

    /// Group text runs into units
    ///
    /// Units may nest (a text box paragraph inside a paragraph); each run
    /// belongs to the innermost open unit.
    pub fn units(&self, spec: UnitSpec<'_>) -> Vec<TextUnit> {
        let mut finished = Vec::new();
        let mut open: Vec<TextUnit> = Vec::new();
        let mut text_start: Option<usize> = None;
        let mut skip_depth = 0usize;

        for (index, event) in self.events.iter().enumerate() {
            match event {
                Event::Start(e) => {
                    let name = e.local_name();
                    if spec.skips(name.as_ref()) {
                        skip_depth += 1;
                    } else if name.as_ref() == spec.unit {
                        open.push(TextUnit::default());
                    } else if name.as_ref() == spec.text && skip_depth == 0 {
                        text_start = Some(index);
                    }
                }
                Event::End(e) => {
                    let name = e.local_name();
                    if spec.skips(name.as_ref()) {
                        skip_depth = skip_depth.saturating_sub(1);
                    } else if name.as_ref() == spec.unit {
                        if let Some(unit) = open.pop() {
                            finished.push(unit);
                        }
                    } else if name.as_ref() == spec.text {
                        text_start = None;
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == spec.unit && skip_depth == 0 => {
                    finished.push(TextUnit::default());
                }
                Event::Text(_) | Event::CData(_) => {
                    if let (Some(start), Some(unit)) = (text_start, open.last_mut()) {
                        unit.runs.push(TextRun { start, text: index });
                    }
                }
                _ => {}
            }
        }
        finished
    }

    /// Unescaped text of each run of `unit`
    pub fn run_texts(&self, unit: &TextUnit) -> Result<Vec<String>, PackageError> {
        unit.runs
            .iter()
            .map(|run| match &self.events[run.text] {
                Event::Text(text) => Ok(text.unescape()?.into_owned()),
                Event::CData(data) => Ok(String::from_utf8_lossy(data).into_owned()),
                _ => Ok(String::new()),
            })
            .collect()
    }

    /// Joined text of every unit, one string per unit
    pub fn unit_strings(&self, spec: UnitSpec<'_>) -> Result<Vec<String>, PackageError> {
        self.units(spec)
            .iter()
            .map(|unit| Ok(self.run_texts(unit)?.concat()))
            .collect()
    }

    /// Replace a run's text, preserving whitespace in the enclosing element
    pub fn set_run_text(&mut self, run: TextRun, text: &str) {
        self.events[run.text] = Event::Text(BytesText::new(text).into_owned());
        if let Event::Start(start) = &self.events[run.start] {
            let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
            let mut preserved = BytesStart::new(name);
            for attr in start.attributes().with_checks(false).flatten() {
                if attr.key.as_ref() != b"xml:space" {
                    preserved.push_attribute(attr);
                }
            }
            preserved.push_attribute(("xml:space", "preserve"));
            self.events[run.start] = Event::Start(preserved);
        }
    }

    /// Run `find` over each unit's joined text and write the replacements back
    ///
    /// Returns how many runs changed; units without matches are left as parsed.
    pub fn fill_units<'d, F>(&mut self, spec: UnitSpec<'_>, mut find: F) -> Result<usize, PackageError>
    where
        F: FnMut(&str) -> Result<Vec<Match<'d>>, PackageError>,
    {
        let mut changed = 0;
        for unit in self.units(spec) {
            let runs = self.run_texts(&unit)?;
            let matches = find(&runs.concat())?;
            if matches.is_empty() {
                continue;
            }
            let filled = redistribute(&runs, &matches);
            for ((run, old), new) in unit.runs.iter().zip(&runs).zip(&filled) {
                if old != new {
                    self.set_run_text(*run, new);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PackageError> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event.clone())?;
        }
        Ok(writer.into_inner())
    }
}
