use once_cell::sync::Lazy;
use regex::Regex;

/// Maps byte offsets in a source text to 1-based line and column numbers.
///
/// Columns count UTF-16 code units, the unit editors measure lines in, so a
/// character outside the Basic Multilingual Plane advances the column by two.
/// Line starts are computed once, which keeps lookups cheap when a whole
/// document's worth of nodes needs converting.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    /// Calculates the 1-based line and column for a byte position in the source.
    /// Positions past the end clamp to the end of the text.
    pub fn line_and_column(&self, position: usize) -> (usize, usize) {
        let position = position.min(self.source.len());
        let line = match self.line_starts.binary_search(&position) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..position)
            .map_or(position - start, column_width);
        (line + 1, column + 1)
    }

    /// The inverse of [`LineIndex::line_and_column`]. A column one past the
    /// last character of a line maps to the end of that line; a column inside
    /// a surrogate pair maps to nothing.
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.source.len(), |next| next - 1);
        let text = self.source.get(start..end)?;
        let column = column.checked_sub(1)?;
        let mut units = 0;
        for (i, c) in text.char_indices() {
            if units == column {
                return Some(start + i);
            }
            units += c.len_utf16();
        }
        (units == column).then_some(end)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Iterates the lines of `text` with their 1-based numbers. A trailing `\r`
/// is dropped so CRLF documents measure the same as LF ones.
pub(crate) fn source_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
}

/// Width of `text` in editor columns (UTF-16 code units).
pub(crate) fn column_width(text: &str) -> usize {
    text.encode_utf16().count()
}

/// 1-based editor column of a byte index within a single line.
pub(crate) fn editor_column(line: &str, byte_index: usize) -> usize {
    line.get(..byte_index).map_or(byte_index, column_width) + 1
}

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("numeric literal pattern is valid")
});

/// True when `text` is a number under the JSON number grammar.
pub(crate) fn looks_numeric(text: &str) -> bool {
    NUMERIC_LITERAL.is_match(text)
}

/// Parses a numeric-looking literal into an integer when it is integral and
/// fits in `i64`.
pub(crate) fn integral_value(text: &str) -> Option<i64> {
    if !looks_numeric(text) {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let float: f64 = text.parse().ok()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.is_finite() && float.fract() == 0.0 && in_range).then_some(float as i64)
}
