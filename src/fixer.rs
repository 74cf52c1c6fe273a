//! Duplicate detection and repair planning.
//!
//! The fixer never edits text. It returns [`FixableRange`]s that a caller
//! applies bottom-to-top, see [`sort_for_application`].

use crate::config::{IdPolicy, StringConflictStrategy};
use crate::converter;
use crate::error::DuplicateIdDiagnostic;
use crate::format::Format;
use crate::locator::{IdOccurrence, IdValue, IdentifierLocator, SourceRange};
use crate::utils::LineIndex;
use log::{debug, warn};
use miette::{NamedSource, SourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

static PLAIN_YAML_SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("plain scalar pattern is valid")
});

const YAML_RESERVED: [&str; 10] = ["true", "false", "null", "yes", "no", "on", "off", "y", "n", "~"];

/// A proposed replacement for one duplicate occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixableRange {
    pub range: SourceRange,
    pub new_value: IdValue,
}

impl FixableRange {
    /// The text to put in place of `range`, written the way `format` needs it.
    ///
    /// JSON string ranges include their quotes, so strings come back quoted.
    /// YAML strings stay plain unless they would read as another type. XML
    /// values are located with their entities as written, so they go back
    /// unchanged.
    pub fn replacement_text(&self, format: Format) -> String {
        let text = match &self.new_value {
            IdValue::Number(n) => return n.to_string(),
            IdValue::Decimal(d) => return d.to_string(),
            IdValue::String(s) => s,
        };
        match format {
            Format::Json => json_quote(text),
            Format::Yaml => {
                let reserved = YAML_RESERVED.contains(&text.to_ascii_lowercase().as_str());
                if PLAIN_YAML_SCALAR.is_match(text) && !reserved {
                    text.clone()
                } else {
                    json_quote(text)
                }
            }
            Format::Xml => text.clone(),
        }
    }
}

fn json_quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Sorts fixes into safe application order: last line first, and right to left
/// within a line, so an applied edit never shifts one still pending.
pub fn sort_for_application(fixes: &mut [FixableRange]) {
    fixes.sort_by(|a, b| {
        (b.range.start_line, b.range.start_column).cmp(&(a.range.start_line, a.range.start_column))
    });
}

/// A repeated identifier: where it appears again and where it was first used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateId {
    pub value: IdValue,
    pub range: SourceRange,
    pub first_range: SourceRange,
}

impl DuplicateId {
    pub fn message(&self) -> String {
        format!("Duplicate ID found: {}. IDs must be unique.", self.value)
    }

    /// Renders the duplicate against its document, labelling both uses.
    pub fn to_diagnostic(&self, text: &str, name: impl AsRef<str>) -> DuplicateIdDiagnostic {
        let index = LineIndex::new(text);
        DuplicateIdDiagnostic {
            src: NamedSource::new(name, text.to_string()),
            first: range_span(&index, &self.first_range),
            duplicate: range_span(&index, &self.range),
            value: self.value.to_string(),
        }
    }
}

fn range_span(index: &LineIndex<'_>, range: &SourceRange) -> SourceSpan {
    let start = index.offset(range.start_line, range.start_column);
    let end = index.offset(range.end_line, range.end_column);
    match (start, end) {
        (Some(start), Some(end)) if end >= start => (start, end - start).into(),
        (Some(start), _) => (start, 0).into(),
        _ => (0, 0).into(),
    }
}

/// Finds duplicate identifiers and plans their repair under an [`IdPolicy`].
#[derive(Debug, Clone, Default)]
pub struct DuplicateFixer {
    policy: IdPolicy,
    locator: IdentifierLocator,
}

impl DuplicateFixer {
    pub fn new(policy: IdPolicy) -> Self {
        let locator = IdentifierLocator::new(&policy);
        Self { policy, locator }
    }

    pub fn policy(&self) -> &IdPolicy {
        &self.policy
    }

    pub fn locator(&self) -> &IdentifierLocator {
        &self.locator
    }

    /// Every occurrence whose value was already used earlier in the document.
    /// Works on documents that do not parse, as far as the locator can see.
    pub fn find_duplicates(&self, text: &str, format: Format) -> Vec<DuplicateId> {
        duplicates_in(&self.locator.locate(text, format))
    }

    /// Fixes for every duplicate, in document order. Documents that fail to
    /// parse get none while `require_parseable` is set.
    pub fn find_fixable_duplicates(&self, text: &str, format: Format) -> Vec<FixableRange> {
        if self.policy.require_parseable {
            if let Err(err) = converter::parse(text, format) {
                debug!("not proposing fixes for unparseable {format} document: {err}");
                return Vec::new();
            }
        }
        self.plan_fixes(&self.locator.locate(text, format))
    }

    /// Assigns a fresh value to each repeated occurrence.
    ///
    /// Numbers continue from the largest numeric id present (at least 0, and
    /// rounded up for decimals), so every assignment is larger than any
    /// original and larger than the assignments before it. Repeated decimals
    /// get whole numbers too.
    pub fn plan_fixes(&self, occurrences: &[IdOccurrence]) -> Vec<FixableRange> {
        let mut max_numeric_id = occurrences
            .iter()
            .filter_map(|o| o.value.numeric_ceiling())
            .fold(0, i64::max);
        let mut taken: HashSet<IdValue> = occurrences.iter().map(|o| o.value.clone()).collect();
        let mut seen: HashSet<&IdValue> = HashSet::new();
        let mut fixes = Vec::new();

        for occurrence in occurrences {
            if seen.insert(&occurrence.value) {
                continue;
            }
            let new_value = match (&occurrence.value, self.policy.string_conflicts) {
                (IdValue::String(_), StringConflictStrategy::ReportOnly) => {
                    debug!("leaving duplicate string id {} for manual resolution", occurrence.value);
                    continue;
                }
                (IdValue::String(original), StringConflictStrategy::Suffix) => {
                    self.next_suffixed(original, &taken)
                }
                _ => {
                    let Some(next) = max_numeric_id.checked_add(1) else {
                        warn!("no numeric id left above {max_numeric_id}; duplicate {} not fixed", occurrence.value);
                        continue;
                    };
                    max_numeric_id = next;
                    IdValue::Number(next)
                }
            };
            taken.insert(new_value.clone());
            fixes.push(FixableRange {
                range: occurrence.range,
                new_value,
            });
        }
        fixes
    }

    fn next_suffixed(&self, original: &str, taken: &HashSet<IdValue>) -> IdValue {
        let separator = &self.policy.suffix_separator;
        (2u64..)
            .map(|n| IdValue::String(format!("{original}{separator}{n}")))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| IdValue::String(original.to_string()))
    }
}

pub(crate) fn duplicates_in(occurrences: &[IdOccurrence]) -> Vec<DuplicateId> {
    let mut first_seen: HashMap<&IdValue, SourceRange> = HashMap::new();
    let mut duplicates = Vec::new();
    for occurrence in occurrences {
        match first_seen.get(&occurrence.value) {
            Some(first_range) => duplicates.push(DuplicateId {
                value: occurrence.value.clone(),
                range: occurrence.range,
                first_range: *first_range,
            }),
            None => {
                first_seen.insert(&occurrence.value, occurrence.range);
            }
        }
    }
    duplicates
}

pub fn find_fixable_duplicates(text: &str, format: Format) -> Vec<FixableRange> {
    DuplicateFixer::default().find_fixable_duplicates(text, format)
}

pub fn find_duplicates(text: &str, format: Format) -> Vec<DuplicateId> {
    DuplicateFixer::default().find_duplicates(text, format)
}

/// Like [`find_fixable_duplicates`]; unknown tags give no fixes.
pub fn find_fixable_duplicates_by_tag(text: &str, tag: &str) -> Vec<FixableRange> {
    match Format::from_tag(tag) {
        Some(format) => find_fixable_duplicates(text, format),
        None => {
            debug!("no fixes for unknown format tag {tag:?}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(value: IdValue, line: usize) -> IdOccurrence {
        IdOccurrence {
            value,
            range: SourceRange::single_line(line, 1, 2),
        }
    }

    #[test]
    fn test_numeric_duplicates_continue_from_max() {
        let occurrences = vec![
            occurrence(IdValue::Number(4), 1),
            occurrence(IdValue::Number(4), 2),
            occurrence(IdValue::Number(9), 3),
            occurrence(IdValue::Number(4), 4),
        ];
        let fixes = DuplicateFixer::default().plan_fixes(&occurrences);
        let values: Vec<_> = fixes.iter().map(|f| f.new_value.clone()).collect();
        assert_eq!(values, [IdValue::Number(10), IdValue::Number(11)]);
        assert_eq!(fixes[0].range.start_line, 2);
        assert_eq!(fixes[1].range.start_line, 4);
    }

    #[test]
    fn test_negative_ids_start_from_zero() {
        let occurrences = vec![
            occurrence(IdValue::Number(-5), 1),
            occurrence(IdValue::Number(-5), 2),
        ];
        let fixes = DuplicateFixer::default().plan_fixes(&occurrences);
        assert_eq!(fixes[0].new_value, IdValue::Number(1));
    }

    #[test]
    fn test_string_suffix_skips_taken_values() {
        let occurrences = vec![
            occurrence(IdValue::String("q".into()), 1),
            occurrence(IdValue::String("q_2".into()), 2),
            occurrence(IdValue::String("q".into()), 3),
            occurrence(IdValue::String("q".into()), 4),
        ];
        let fixes = DuplicateFixer::default().plan_fixes(&occurrences);
        let values: Vec<_> = fixes.iter().map(|f| f.new_value.to_string()).collect();
        assert_eq!(values, ["q_3", "q_4"]);
    }

    #[test]
    fn test_string_strategies() {
        let occurrences = vec![
            occurrence(IdValue::Number(3), 1),
            occurrence(IdValue::String("a".into()), 2),
            occurrence(IdValue::String("a".into()), 3),
        ];
        let renumber = DuplicateFixer::new(
            IdPolicy::default().with_string_conflicts(StringConflictStrategy::Renumber),
        );
        assert_eq!(renumber.plan_fixes(&occurrences)[0].new_value, IdValue::Number(4));

        let report_only = DuplicateFixer::new(
            IdPolicy::default().with_string_conflicts(StringConflictStrategy::ReportOnly),
        );
        assert!(report_only.plan_fixes(&occurrences).is_empty());
    }

    #[test]
    fn test_number_and_string_with_same_text_are_distinct() {
        let occurrences = vec![
            occurrence(IdValue::Number(1), 1),
            occurrence(IdValue::String("1".into()), 2),
        ];
        assert!(DuplicateFixer::default().plan_fixes(&occurrences).is_empty());
    }

    #[test]
    fn test_decimal_ids_are_numbers() {
        let text = r#"[{"id": 1.5}, {"id": "1.5"}, {"id": 2.5}, {"id": 2.5}]"#;
        let duplicates = find_duplicates(text, Format::Json);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].value.to_string(), "2.5");

        // 2.5 rounds up to 3, so the counter continues at 4.
        let fixes = find_fixable_duplicates(text, Format::Json);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].new_value, IdValue::Number(4));
        assert_eq!(fixes[0].replacement_text(Format::Json), "4");
        assert_eq!(fixes[0].replacement_text(Format::Yaml), "4");
    }

    #[test]
    fn test_overflow_is_skipped() {
        let occurrences = vec![
            occurrence(IdValue::Number(i64::MAX), 1),
            occurrence(IdValue::Number(i64::MAX), 2),
        ];
        assert!(DuplicateFixer::default().plan_fixes(&occurrences).is_empty());
    }

    #[test]
    fn test_replacement_text() {
        let range = SourceRange::single_line(1, 1, 2);
        let fix = |value: &str| FixableRange {
            range,
            new_value: IdValue::String(value.into()),
        };
        assert_eq!(fix("q_2").replacement_text(Format::Json), "\"q_2\"");
        assert_eq!(fix("q_2").replacement_text(Format::Yaml), "q_2");
        assert_eq!(fix("yes").replacement_text(Format::Yaml), "\"yes\"");
        assert_eq!(fix("5_2").replacement_text(Format::Yaml), "\"5_2\"");
        assert_eq!(fix("a&amp;b_2").replacement_text(Format::Xml), "a&amp;b_2");
        let numeric = FixableRange {
            range,
            new_value: IdValue::Number(12),
        };
        assert_eq!(numeric.replacement_text(Format::Json), "12");
    }

    #[test]
    fn test_sort_for_application() {
        let make = |line, column| FixableRange {
            range: SourceRange::single_line(line, column, column + 1),
            new_value: IdValue::Number(1),
        };
        let mut fixes = vec![make(1, 40), make(3, 2), make(1, 17)];
        sort_for_application(&mut fixes);
        let order: Vec<_> = fixes
            .iter()
            .map(|f| (f.range.start_line, f.range.start_column))
            .collect();
        assert_eq!(order, [(3, 2), (1, 40), (1, 17)]);
    }

    #[test]
    fn test_duplicate_message_and_diagnostic() {
        let text = "- id: 5\n- id: 5\n";
        let duplicates = find_duplicates(text, Format::Yaml);
        assert_eq!(duplicates.len(), 1);
        let duplicate = &duplicates[0];
        assert_eq!(duplicate.message(), "Duplicate ID found: 5. IDs must be unique.");
        assert_eq!(duplicate.first_range, SourceRange::single_line(1, 7, 8));

        let diagnostic = duplicate.to_diagnostic(text, "survey.yaml");
        assert_eq!(diagnostic.first, SourceSpan::from((6, 1)));
        assert_eq!(diagnostic.duplicate, SourceSpan::from((14, 1)));
        assert_eq!(diagnostic.to_string(), duplicate.message());
    }

    #[test]
    fn test_unparseable_document_gets_no_fixes() {
        let text = "{\n  \"id\": 1,\n  \"id\": 1,\n";
        assert!(find_fixable_duplicates(text, Format::Json).is_empty());
        assert_eq!(find_duplicates(text, Format::Json).len(), 1);

        let lenient = DuplicateFixer::new(IdPolicy {
            require_parseable: false,
            ..IdPolicy::default()
        });
        assert_eq!(lenient.find_fixable_duplicates(text, Format::Json).len(), 1);
    }

    #[test]
    fn test_unknown_tag_gives_no_fixes() {
        assert!(find_fixable_duplicates_by_tag("- id: 1\n- id: 1\n", "ini").is_empty());
        assert_eq!(find_fixable_duplicates_by_tag("- id: 1\n- id: 1\n", "yaml").len(), 1);
    }
}
