//! Queries an editor surface runs against identifier ranges: which lines and
//! positions are locked, whether an edit may go through, and what to
//! decorate.

use crate::format::Format;
use crate::locator::{IdentifierLocator, SourceRange};
use crate::utils::{column_width, source_lines};
use serde::Serialize;
use std::collections::BTreeSet;

pub const READ_ONLY_HOVER: &str = "This line is read-only (ID)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecorationKind {
    /// Highlights the whole line holding an identifier.
    ReadOnlyLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub range: SourceRange,
    pub kind: DecorationKind,
    pub hover_message: &'static str,
}

/// The read-only identifier ranges of one version of a document.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyGuard {
    ranges: Vec<SourceRange>,
}

impl ReadOnlyGuard {
    pub fn from_ranges(ranges: Vec<SourceRange>) -> Self {
        Self { ranges }
    }

    pub fn from_text(text: &str, format: Format) -> Self {
        Self::from_text_with(&IdentifierLocator::default(), text, format)
    }

    pub fn from_text_with(locator: &IdentifierLocator, text: &str, format: Format) -> Self {
        Self::from_ranges(locator.read_only_ranges(text, format))
    }

    pub fn ranges(&self) -> &[SourceRange] {
        &self.ranges
    }

    /// Keystrokes on these lines are swallowed, apart from navigation.
    pub fn is_line_read_only(&self, line: usize) -> bool {
        self.ranges
            .iter()
            .any(|r| line >= r.start_line && line <= r.end_line)
    }

    pub fn is_position_read_only(&self, line: usize, column: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(line, column))
    }

    /// True when `edit` lies entirely within the lines of a read-only range.
    /// Edits that only start or end inside one are let through.
    pub fn blocks_edit(&self, edit: &SourceRange) -> bool {
        self.ranges
            .iter()
            .any(|r| edit.start_line >= r.start_line && edit.end_line <= r.end_line)
    }

    /// Whole-line decorations, one per read-only range.
    pub fn decorations(&self) -> Vec<Decoration> {
        self.ranges
            .iter()
            .map(|range| Decoration {
                range: *range,
                kind: DecorationKind::ReadOnlyLine,
                hover_message: READ_ONLY_HOVER,
            })
            .collect()
    }
}

/// Full-width ranges of every line holding an identifier, one per line.
pub fn id_line_ranges(text: &str, format: Format) -> Vec<SourceRange> {
    let guard = ReadOnlyGuard::from_text(text, format);
    let locked: BTreeSet<usize> = guard
        .ranges()
        .iter()
        .flat_map(|r| r.start_line..=r.end_line)
        .collect();
    source_lines(text)
        .filter(|(number, _)| locked.contains(number))
        .map(|(number, line)| SourceRange::single_line(number, 1, column_width(line) + 1))
        .collect()
}
