//! Splits a VCT document into begin/end delimited sections and walks the
//! lines of one section.

use crate::error::{Result, VctError};

/// Section kinds of a VCT document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SectionKind {
    Comment,
    Head,
    FeatureCode,
    TableStructure,
    Point,
    Line,
    Polygon,
    Solid,
    Aggregation,
    Annotation,
    Topology,
    Attribute,
    Style,
}

const ALL_KINDS: [SectionKind; 13] = [
    SectionKind::Comment,
    SectionKind::Head,
    SectionKind::FeatureCode,
    SectionKind::TableStructure,
    SectionKind::Point,
    SectionKind::Line,
    SectionKind::Polygon,
    SectionKind::Solid,
    SectionKind::Aggregation,
    SectionKind::Annotation,
    SectionKind::Topology,
    SectionKind::Attribute,
    SectionKind::Style,
];

impl SectionKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            SectionKind::Comment => "Comment",
            SectionKind::Head => "Head",
            SectionKind::FeatureCode => "FeatureCode",
            SectionKind::TableStructure => "TableStructure",
            SectionKind::Point => "Point",
            SectionKind::Line => "Line",
            SectionKind::Polygon => "Polygon",
            SectionKind::Solid => "Solid",
            SectionKind::Aggregation => "Aggregation",
            SectionKind::Annotation => "Annotation",
            SectionKind::Topology => "Topology",
            SectionKind::Attribute => "Attribute",
            SectionKind::Style => "Style",
        }
    }

    fn from_begin_marker(line: &str) -> Option<Self> {
        let name = line.strip_suffix("Begin")?;
        ALL_KINDS.into_iter().find(|kind| kind.name() == name)
    }

    fn is_end_marker(self, line: &str) -> bool {
        line.strip_suffix("End") == Some(self.name())
    }
}

/// The content lines of one section, without its markers.
#[derive(Debug)]
pub(crate) struct Section<'a> {
    pub(crate) kind: SectionKind,
    /// 1-based line number of the first content line.
    pub(crate) first_line: usize,
    pub(crate) lines: Vec<&'a str>,
}

/// Split `text` into sections. Lines outside any section are ignored;
/// markers must match the trimmed line exactly.
pub(crate) fn split_sections(text: &str) -> Result<Vec<Section<'_>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections = Vec::new();
    let mut current: Option<Section<'_>> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        // `str::lines` already drops a trailing '\r'.
        let trimmed = raw.trim();

        match current.as_mut() {
            Some(section) => {
                if section.kind.is_end_marker(trimmed) {
                    sections.extend(current.take());
                } else {
                    section.lines.push(raw);
                }
            }
            None => {
                if let Some(kind) = SectionKind::from_begin_marker(trimmed) {
                    current = Some(Section {
                        kind,
                        first_line: line_number + 1,
                        lines: Vec::new(),
                    });
                }
            }
        }
    }

    match current {
        Some(section) => Err(VctError::UnterminatedSection {
            section: section.kind.name(),
            line: section.first_line - 1,
        }),
        None => Ok(sections),
    }
}

/// Sequential reader over the lines of one section.
pub(crate) struct LineCursor<'s, 'a> {
    section: &'s Section<'a>,
    pos: usize,
}

impl<'s, 'a> LineCursor<'s, 'a> {
    pub(crate) fn new(section: &'s Section<'a>) -> Self {
        Self { section, pos: 0 }
    }

    pub(crate) fn section_name(&self) -> &'static str {
        self.section.kind.name()
    }

    /// Line number of the line most recently returned.
    pub(crate) fn line_number(&self) -> usize {
        self.section.first_line + self.pos.saturating_sub(1)
    }

    pub(crate) fn next_line(&mut self) -> Result<&'a str> {
        let line: &'a str =
            self.section
                .lines
                .get(self.pos)
                .copied()
                .ok_or(VctError::UnexpectedEndOfSection {
                    section: self.section_name(),
                })?;
        self.pos += 1;
        Ok(line.trim())
    }

    pub(crate) fn peek_line(&self) -> Option<&'a str> {
        self.section.lines.get(self.pos).copied().map(str::trim)
    }

    /// Skip blank lines; returns false once the section is exhausted.
    pub(crate) fn skip_blank(&mut self) -> bool {
        while let Some(line) = self.peek_line() {
            if !line.is_empty() {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    pub(crate) fn next_int(&mut self) -> Result<i64> {
        let line = self.next_line()?;
        parse_int(line, self.line_number())
    }

    pub(crate) fn next_count(&mut self) -> Result<usize> {
        let line = self.next_line()?;
        parse_count(line, self.line_number())
    }

    pub(crate) fn next_coord(&mut self) -> Result<(f64, f64)> {
        let line = self.next_line()?;
        parse_coord(line, self.line_number())
    }

    /// Consume the end-of-record flag, which must be exactly `0`, and the
    /// blank separator after it when there is one.
    pub(crate) fn end_record(&mut self) -> Result<()> {
        let flag = self.next_line()?;
        if flag != "0" {
            return Err(VctError::UnexpectedToken {
                line: self.line_number(),
                expected: "end-of-record flag 0",
                value: flag.to_string(),
            });
        }
        self.consume_separator();
        Ok(())
    }

    pub(crate) fn consume_separator(&mut self) {
        if self.peek_line() == Some("") {
            self.pos += 1;
        }
    }

    /// Advance past the `0` line that terminates the current record. A
    /// record terminator is a `0` followed by a blank line or the end of the
    /// section.
    pub(crate) fn skip_record(&mut self) -> Result<()> {
        loop {
            let line = self.next_line()?;
            if line == "0" && matches!(self.peek_line(), None | Some("")) {
                self.consume_separator();
                return Ok(());
            }
        }
    }
}

pub(crate) fn parse_int(value: &str, line: usize) -> Result<i64> {
    value.trim().parse().map_err(|_| VctError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_count(value: &str, line: usize) -> Result<usize> {
    value.trim().parse().map_err(|_| VctError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_coord(value: &str, line: usize) -> Result<(f64, f64)> {
    let invalid = || VctError::InvalidCoordinate {
        line,
        value: value.to_string(),
    };
    let mut parts = value.split(',');
    let x = parts.next().ok_or_else(invalid)?;
    let y = parts.next().ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}
