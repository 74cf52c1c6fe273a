//! Keeps record ids stable across an edit session in which the editor never
//! shows them.
//!
//! Before editing, ids are remembered by normalized label and stripped. After
//! editing, each record gets its id back by label, and records with no known
//! label get a freshly generated one. Storing the map is the caller's concern.

use crate::config::IdPolicy;
use crate::locator::IdValue;
use crate::tree::DocumentTree;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Normalized label → id.
pub type LabelIdMap = IndexMap<String, IdValue>;

/// Collapses whitespace runs to one space, trims and lowercases.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A new id that cannot collide in practice: `prefix` followed by a v4 UUID.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4())
}

fn label_of<'a>(record: &'a DocumentTree, policy: &IdPolicy) -> Option<&'a str> {
    record.get(&policy.label_key)?.as_str()
}

/// Zero and the empty string count as no id at all.
fn id_of(record: &DocumentTree, policy: &IdPolicy) -> Option<IdValue> {
    match record.get(&policy.id_key)? {
        DocumentTree::Integer(n) if *n != 0 => Some(IdValue::Number(*n)),
        DocumentTree::Float(f) if *f != 0.0 => {
            serde_json::Number::from_f64(*f).map(IdValue::Decimal)
        }
        DocumentTree::String(s) if !s.is_empty() => Some(IdValue::String(s.clone())),
        _ => None,
    }
}

fn id_tree(id: IdValue) -> DocumentTree {
    match id {
        IdValue::Number(n) => DocumentTree::Integer(n),
        IdValue::Decimal(d) => d.as_f64().map_or(DocumentTree::Null, DocumentTree::Float),
        IdValue::String(s) => DocumentTree::String(s),
    }
}

/// Maps each labelled record's normalized label to its id. Records missing
/// either are skipped; a later record with the same label wins.
pub fn build_label_id_map(records: &[DocumentTree], policy: &IdPolicy) -> LabelIdMap {
    let mut map = LabelIdMap::new();
    for record in records {
        let (Some(label), Some(id)) = (label_of(record, policy), id_of(record, policy)) else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        map.insert(normalize_label(label), id);
    }
    map
}

/// Copies of the records without their id field.
pub fn strip_ids(records: &[DocumentTree], policy: &IdPolicy) -> Vec<DocumentTree> {
    records
        .iter()
        .map(|record| match record {
            DocumentTree::Object(fields) => {
                let mut fields = fields.clone();
                fields.shift_remove(&policy.id_key);
                DocumentTree::Object(fields)
            }
            other => other.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    /// Records that got their original id back.
    pub reused: usize,
    /// Records that got a fresh id, for any reason.
    pub generated: usize,
    pub unmatched_labels: Vec<String>,
    /// Fresh ids handed out because another record already claimed the label's id.
    pub duplicates_generated: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreResult {
    pub restored: Vec<DocumentTree>,
    pub summary: RestoreSummary,
}

/// Gives every edited record an id: the remembered one for the first record
/// carrying a known label, a generated one otherwise. Non-object records pass
/// through untouched.
pub fn restore_ids_by_label(
    edited: &[DocumentTree],
    map: &LabelIdMap,
    policy: &IdPolicy,
) -> RestoreResult {
    let mut used: HashSet<&IdValue> = HashSet::new();
    let mut summary = RestoreSummary::default();
    let mut restored = Vec::with_capacity(edited.len());

    for record in edited {
        let DocumentTree::Object(fields) = record else {
            restored.push(record.clone());
            continue;
        };
        let label = label_of(record, policy).unwrap_or_default();
        let id = match map.get(&normalize_label(label)) {
            Some(original) if used.insert(original) => {
                summary.reused += 1;
                original.clone()
            }
            Some(_) => {
                summary.generated += 1;
                summary.duplicates_generated += 1;
                IdValue::String(generate_id(&policy.generated_id_prefix))
            }
            None => {
                summary.generated += 1;
                summary.unmatched_labels.push(label.to_string());
                IdValue::String(generate_id(&policy.generated_id_prefix))
            }
        };
        let mut fields = fields.clone();
        fields.insert(policy.id_key.clone(), id_tree(id));
        restored.push(DocumentTree::Object(fields));
    }

    RestoreResult { restored, summary }
}
