use super::{IdOccurrence, IdValue, IdentifierAdapter, SourceRange};
use crate::config::IdPolicy;
use crate::format::Format;
use crate::utils::{column_width, editor_column, source_lines};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_ID_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| id_line_pattern(IdPolicy::DEFAULT_ID_KEY));

/// Matches `id: value` and `- id: value` lines. No YAML grammar beyond that.
pub struct YamlAdapter {
    line_pattern: Option<Regex>,
}

impl YamlAdapter {
    pub fn new(id_key: &str) -> Self {
        let line_pattern = if id_key == IdPolicy::DEFAULT_ID_KEY {
            (*DEFAULT_ID_LINE).clone()
        } else {
            id_line_pattern(id_key)
        };
        Self { line_pattern }
    }
}

impl IdentifierAdapter for YamlAdapter {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn locate_identifiers(&self, text: &str) -> Vec<IdOccurrence> {
        let Some(pattern) = &self.line_pattern else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for (line_number, line) in source_lines(text) {
            let Some(captures) = pattern.captures(line) else {
                continue;
            };
            let (Some(prefix), Some(rest)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let Some((literal, value)) = scalar_value(rest.as_str()) else {
                continue;
            };
            let start_column = editor_column(line, prefix.end());
            let end_column = start_column + column_width(literal);
            found.push(IdOccurrence {
                value,
                range: SourceRange::single_line(line_number, start_column, end_column),
            });
        }
        found
    }
}

fn id_line_pattern(id_key: &str) -> Option<Regex> {
    Regex::new(&format!(r"^(\s*-?\s*{}:\s*)(.+)$", regex::escape(id_key)))
        .map_err(|err| warn!("cannot build YAML id line pattern for {id_key:?}: {err}"))
        .ok()
}

/// Splits the text after `id:` into the literal as written and its value.
/// Returns `None` for empty values, comments and flow collections.
fn scalar_value(rest: &str) -> Option<(&str, IdValue)> {
    if rest.starts_with(['{', '[', '#']) {
        return None;
    }
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let literal = quoted_literal(rest, quote)?;
            let inner = &literal[1..literal.len() - 1];
            let value = if quote == '\'' {
                inner.replace("''", "'")
            } else {
                serde_json::from_str::<String>(literal).unwrap_or_else(|_| inner.to_string())
            };
            Some((literal, IdValue::String(value)))
        }
        _ => {
            let literal = strip_comment(rest).trim_end();
            if literal.is_empty() {
                return None;
            }
            Some((literal, IdValue::from_literal(literal)))
        }
    }
}

/// The quoted scalar at the start of `rest`, quotes included. An unclosed
/// quote is not an identifier we can safely point at.
fn quoted_literal(rest: &str, quote: char) -> Option<&str> {
    let mut chars = rest.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if quote == '"' => {
                chars.next();
            }
            c if c == quote => {
                // `''` is an escaped quote inside single-quoted scalars.
                if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                    chars.next();
                    continue;
                }
                return Some(&rest[..i + c.len_utf8()]);
            }
            _ => {}
        }
    }
    None
}

/// Drops a trailing ` # comment` from a plain scalar.
fn strip_comment(rest: &str) -> &str {
    let bytes = rest.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
            return &rest[..i];
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(text: &str) -> Vec<IdOccurrence> {
        YamlAdapter::new("id").locate_identifiers(text)
    }

    #[test]
    fn test_sequence_items() {
        let found = locate("- id: 5\n  label: A\n- id: 5\n- id: 7\n");
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].range, SourceRange::single_line(1, 7, 8));
        assert_eq!(found[1].range, SourceRange::single_line(3, 7, 8));
        assert_eq!(found[2].value, IdValue::Number(7));
    }

    #[test]
    fn test_nested_mapping_and_trailing_space() {
        let found = locate("questions:\n  - label: A\n    id: q-10   \n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, IdValue::String("q-10".into()));
        assert_eq!(found[0].range, SourceRange::single_line(3, 9, 13));
    }

    #[test]
    fn test_comment_is_not_part_of_value() {
        let found = locate("- id: 12 # keep\n");
        assert_eq!(found[0].value, IdValue::Number(12));
        assert_eq!(found[0].range, SourceRange::single_line(1, 7, 9));
    }

    #[test]
    fn test_quoted_values() {
        let found = locate("- id: \"5\"\n- id: 'it''s'\n- id: 'open\n");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, IdValue::String("5".into()));
        assert_eq!(found[0].range, SourceRange::single_line(1, 7, 10));
        assert_eq!(found[1].value, IdValue::String("it's".into()));
    }

    #[test]
    fn test_skips_collections_empty_values_and_other_keys() {
        let text = "- id: {a: 1}\n- id: [1]\n- id:\n- uuid: 3\n- idx: 4\n";
        assert!(locate(text).is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let found = locate("- id: 1\r\n- id: 2\r\n");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].range, SourceRange::single_line(2, 7, 8));
    }
}
