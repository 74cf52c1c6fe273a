use super::{IdOccurrence, IdValue, IdentifierAdapter, SourceRange};
use crate::ast::{JsonValue, JsonValueKind};
use crate::format::Format;
use crate::parser::Parser;
use crate::utils::{column_width, editor_column, source_lines, LineIndex};
use log::{debug, warn};
use regex::Regex;

/// The ways the JSON adapter can extract identifiers, tried in order until one
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStrategy {
    /// Parse the document and walk the syntax tree.
    Ast,
    /// Match `"id": value` lines. Works on broken documents.
    LineHeuristic,
}

pub struct JsonAdapter {
    id_key: String,
    line_pattern: Option<Regex>,
    strategies: Vec<JsonStrategy>,
}

impl JsonAdapter {
    pub fn new(id_key: &str) -> Self {
        Self::with_strategies(id_key, vec![JsonStrategy::Ast, JsonStrategy::LineHeuristic])
    }

    pub fn with_strategies(id_key: &str, strategies: Vec<JsonStrategy>) -> Self {
        // The value is a string literal or a bare token; containers never match,
        // and anything but closers after the value makes the line ambiguous.
        let pattern = format!(
            r#"^(\s*"{}"\s*:\s*)("(?:[^"\\]|\\.)*"|[^\s,{{}}\[\]"][^\s,{{}}\[\]]*)[\s,}}\]]*$"#,
            regex::escape(&json_escape_key(id_key))
        );
        let line_pattern = Regex::new(&pattern)
            .map_err(|err| warn!("cannot build JSON id line pattern for {id_key:?}: {err}"))
            .ok();
        Self {
            id_key: id_key.to_string(),
            line_pattern,
            strategies,
        }
    }

    fn attempt(&self, strategy: JsonStrategy, text: &str) -> Option<Vec<IdOccurrence>> {
        match strategy {
            JsonStrategy::Ast => match Parser::new(text).parse_document() {
                Ok(document) => {
                    let index = LineIndex::new(text);
                    let mut found = Vec::new();
                    self.collect(&document.root, &index, &mut found);
                    Some(found)
                }
                Err(err) => {
                    debug!("JSON parse failed, falling back: {err}");
                    None
                }
            },
            JsonStrategy::LineHeuristic => Some(self.scan_lines(text)),
        }
    }

    fn collect(&self, value: &JsonValue, index: &LineIndex<'_>, found: &mut Vec<IdOccurrence>) {
        match &value.kind {
            JsonValueKind::Object(members) => {
                for member in members {
                    if member.key == self.id_key {
                        if let Some(id) = literal_id(&member.value) {
                            found.push(IdOccurrence {
                                value: id,
                                range: node_range(&member.value, index),
                            });
                        }
                    }
                    self.collect(&member.value, index, found);
                }
            }
            JsonValueKind::Array(items) => {
                for item in items {
                    self.collect(item, index, found);
                }
            }
            _ => {}
        }
    }

    fn scan_lines(&self, text: &str) -> Vec<IdOccurrence> {
        let Some(pattern) = &self.line_pattern else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for (line_number, line) in source_lines(text) {
            let Some(captures) = pattern.captures(line) else {
                continue;
            };
            let (Some(prefix), Some(literal)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let start_column = editor_column(line, prefix.end());
            let end_column = start_column + column_width(literal.as_str());
            found.push(IdOccurrence {
                value: heuristic_value(literal.as_str()),
                range: SourceRange::single_line(line_number, start_column, end_column),
            });
        }
        found
    }
}

impl IdentifierAdapter for JsonAdapter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn locate_identifiers(&self, text: &str) -> Vec<IdOccurrence> {
        for strategy in &self.strategies {
            if let Some(found) = self.attempt(*strategy, text) {
                return found;
            }
        }
        Vec::new()
    }
}

/// Only strings and numbers can be identifiers.
fn literal_id(value: &JsonValue) -> Option<IdValue> {
    match &value.kind {
        JsonValueKind::String(s) => Some(IdValue::String(s.clone())),
        JsonValueKind::Number(n) => Some(IdValue::from_literal(n)),
        _ => None,
    }
}

fn node_range(value: &JsonValue, index: &LineIndex<'_>) -> SourceRange {
    let (start_line, start_column) = index.line_and_column(value.pos_start);
    let (end_line, end_column) = index.line_and_column(value.pos_end);
    SourceRange {
        start_line,
        start_column,
        end_line,
        end_column,
    }
}

fn heuristic_value(literal: &str) -> IdValue {
    if literal.starts_with('"') {
        let decoded = serde_json::from_str::<String>(literal)
            .unwrap_or_else(|_| literal.trim_matches('"').to_string());
        IdValue::String(decoded)
    } else {
        IdValue::from_literal(literal)
    }
}

/// The key as it would appear between quotes in JSON source.
fn json_escape_key(key: &str) -> String {
    let quoted = serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""));
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(text: &str) -> Vec<IdOccurrence> {
        JsonAdapter::new("id").locate_identifiers(text)
    }

    #[test]
    fn test_ast_finds_nested_ids() {
        let text = "{\n  \"questions\": [\n    {\"id\": 1, \"label\": \"A\"},\n    {\"id\": \"q2\"}\n  ]\n}";
        let found = locate(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, IdValue::Number(1));
        assert_eq!(found[0].range, SourceRange::single_line(3, 12, 13));
        assert_eq!(found[1].value, IdValue::String("q2".into()));
        // The string range covers its quotes.
        assert_eq!(found[1].range, SourceRange::single_line(4, 12, 16));
    }

    #[test]
    fn test_ast_skips_non_scalar_ids() {
        let found = locate(r#"{"id": {"id": 3}, "x": [{"id": true}, {"id": null}, {"id": [1]}]}"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, IdValue::Number(3));
    }

    #[test]
    fn test_fallback_on_broken_json() {
        let text = "{\n  \"questions\": [\n    {\n      \"id\": 7,\n      \"label\": \"x\"\n    },\n    {\n      \"id\": \"b\" ,  \n";
        let found = locate(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, IdValue::Number(7));
        assert_eq!(found[0].range, SourceRange::single_line(4, 13, 14));
        assert_eq!(found[1].value, IdValue::String("b".into()));
        assert_eq!(found[1].range, SourceRange::single_line(8, 13, 16));
    }

    #[test]
    fn test_fallback_ignores_containers_and_ambiguous_lines() {
        let text = "{\n  \"id\": {\n  \"id\": [1],\n  \"id\": 1, \"name\": \"x\"\n";
        assert!(locate(text).is_empty());
    }

    #[test]
    fn test_ast_only_strategy_gives_nothing_for_broken_input() {
        let adapter = JsonAdapter::with_strategies("id", vec![JsonStrategy::Ast]);
        assert!(adapter.locate_identifiers("{\n  \"id\": 1,\n").is_empty());
    }

    #[test]
    fn test_key_with_regex_metacharacters() {
        let adapter = JsonAdapter::new("a.b");
        assert!(adapter.locate_identifiers("{\n  \"axb\": 1,\n").is_empty());
        assert_eq!(adapter.locate_identifiers("{\n  \"a.b\": 1,\n").len(), 1);
    }
}
