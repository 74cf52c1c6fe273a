//! Finds every identifier field in a document and reports where its value sits.
//!
//! One adapter per format implements [`IdentifierAdapter`]. JSON is parsed for
//! real; YAML and XML are scanned line by line, since the only structural fact
//! needed is the position of a scalar bound to a fixed key.

pub mod json;
pub mod xml;
pub mod yaml;

pub use json::{JsonAdapter, JsonStrategy};
pub use xml::XmlAdapter;
pub use yaml::YamlAdapter;

use crate::config::IdPolicy;
use crate::format::Format;
use crate::utils::{integral_value, looks_numeric};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A 1-based span of text in the host editor's convention: columns count
/// UTF-16 code units and `end_column` is one past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceRange {
    pub fn single_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start_line: line,
            start_column,
            end_line: line,
            end_column,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    /// True when the caret at `(line, column)` touches this range, including
    /// the position right after its last character.
    pub fn contains(&self, line: usize, column: usize) -> bool {
        let after_start =
            line > self.start_line || (line == self.start_line && column >= self.start_column);
        let before_end =
            line < self.end_line || (line == self.end_line && column <= self.end_column);
        after_start && before_end
    }
}

/// The value bound to an identifier field. Values of different variants are
/// never equal, so `1`, `1.5` and `"1.5"` are three distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    /// A number that is not a whole `i64`, such as `1.5` or `1e20`.
    Decimal(serde_json::Number),
    String(String),
}

impl IdValue {
    /// Reads an unquoted literal: integral numerals become numbers, other
    /// numerals decimals, and anything else stays text.
    pub fn from_literal(text: &str) -> Self {
        let text = text.trim();
        if let Some(n) = integral_value(text) {
            return IdValue::Number(n);
        }
        if looks_numeric(text) {
            if let Some(decimal) = text.parse().ok().and_then(serde_json::Number::from_f64) {
                return IdValue::Decimal(decimal);
            }
        }
        IdValue::String(text.to_string())
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            IdValue::Number(n) => Some(*n),
            IdValue::Decimal(_) | IdValue::String(_) => None,
        }
    }

    /// The smallest integer not below this numeric id. Strings, and decimals
    /// beyond the `i64` range, have none.
    pub fn numeric_ceiling(&self) -> Option<i64> {
        match self {
            IdValue::Number(n) => Some(*n),
            IdValue::Decimal(d) => {
                let ceiling = d.as_f64()?.ceil();
                let in_range = ceiling >= i64::MIN as f64 && ceiling < i64::MAX as f64;
                in_range.then_some(ceiling as i64)
            }
            IdValue::String(_) => None,
        }
    }
}

impl Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Number(n) => write!(f, "{n}"),
            IdValue::Decimal(d) => write!(f, "{d}"),
            IdValue::String(s) => f.write_str(s),
        }
    }
}

/// One identifier field found in a document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdOccurrence {
    pub value: IdValue,
    pub range: SourceRange,
}

/// Turns raw document text into identifier occurrences. Implementations never
/// fail: on internal trouble they return whatever a simpler policy can find.
pub trait IdentifierAdapter {
    fn format(&self) -> Format;

    fn locate_identifiers(&self, text: &str) -> Vec<IdOccurrence>;
}

/// Dispatches to the adapter for a format, using the key name from a policy.
#[derive(Debug, Clone)]
pub struct IdentifierLocator {
    id_key: String,
}

impl Default for IdentifierLocator {
    fn default() -> Self {
        Self::new(&IdPolicy::default())
    }
}

impl IdentifierLocator {
    pub fn new(policy: &IdPolicy) -> Self {
        Self::with_key(policy.id_key.clone())
    }

    pub fn with_key(id_key: impl Into<String>) -> Self {
        Self {
            id_key: id_key.into(),
        }
    }

    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    pub fn adapter(&self, format: Format) -> Box<dyn IdentifierAdapter> {
        match format {
            Format::Json => Box::new(JsonAdapter::new(&self.id_key)),
            Format::Yaml => Box::new(YamlAdapter::new(&self.id_key)),
            Format::Xml => Box::new(XmlAdapter::new(&self.id_key)),
        }
    }

    pub fn locate(&self, text: &str, format: Format) -> Vec<IdOccurrence> {
        self.adapter(format).locate_identifiers(text)
    }

    /// The spans an editor should refuse to modify.
    pub fn read_only_ranges(&self, text: &str, format: Format) -> Vec<SourceRange> {
        self.locate(text, format)
            .into_iter()
            .map(|occurrence| occurrence.range)
            .collect()
    }
}

pub fn locate_identifiers(text: &str, format: Format) -> Vec<IdOccurrence> {
    IdentifierLocator::default().locate(text, format)
}

pub fn get_read_only_ranges(text: &str, format: Format) -> Vec<SourceRange> {
    IdentifierLocator::default().read_only_ranges(text, format)
}

/// Like [`locate_identifiers`], for callers holding a raw format tag. Unknown
/// tags find nothing.
pub fn locate_identifiers_by_tag(text: &str, tag: &str) -> Vec<IdOccurrence> {
    match Format::from_tag(tag) {
        Some(format) => locate_identifiers(text, format),
        None => {
            log::debug!("no identifier adapter for format tag {tag:?}");
            Vec::new()
        }
    }
}

pub fn get_read_only_ranges_by_tag(text: &str, tag: &str) -> Vec<SourceRange> {
    locate_identifiers_by_tag(text, tag)
        .into_iter()
        .map(|occurrence| occurrence.range)
        .collect()
}
