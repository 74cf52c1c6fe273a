use super::{IdOccurrence, IdValue, IdentifierAdapter, SourceRange};
use crate::config::IdPolicy;
use crate::format::Format;
use crate::utils::{column_width, editor_column, source_lines};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_ID_ELEMENT: Lazy<Option<Regex>> =
    Lazy::new(|| id_element_pattern(IdPolicy::DEFAULT_ID_KEY));

/// Matches `<id>value</id>` on a single line. Several matches per line are
/// separate occurrences.
pub struct XmlAdapter {
    element_pattern: Option<Regex>,
}

impl XmlAdapter {
    pub fn new(id_key: &str) -> Self {
        let element_pattern = if id_key == IdPolicy::DEFAULT_ID_KEY {
            (*DEFAULT_ID_ELEMENT).clone()
        } else {
            id_element_pattern(id_key)
        };
        Self { element_pattern }
    }
}

impl IdentifierAdapter for XmlAdapter {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn locate_identifiers(&self, text: &str) -> Vec<IdOccurrence> {
        let Some(pattern) = &self.element_pattern else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for (line_number, line) in source_lines(text) {
            for captures in pattern.captures_iter(line) {
                let Some(content) = captures.get(1) else {
                    continue;
                };
                let start_column = editor_column(line, content.start());
                let end_column = start_column + column_width(content.as_str());
                found.push(IdOccurrence {
                    value: IdValue::from_literal(content.as_str()),
                    range: SourceRange::single_line(line_number, start_column, end_column),
                });
            }
        }
        found
    }
}

fn id_element_pattern(id_key: &str) -> Option<Regex> {
    let key = regex::escape(id_key);
    Regex::new(&format!(r"<{key}>(.*?)</{key}>"))
        .map_err(|err| warn!("cannot build XML id element pattern for {id_key:?}: {err}"))
        .ok()
}
