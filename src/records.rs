//! Duplicate checks over a parsed tree rather than raw text.
//!
//! Only the record list under `IdPolicy::records_key` is examined, and only
//! integer identifiers take part.

use crate::config::IdPolicy;
use crate::tree::DocumentTree;
use serde::Serialize;
use std::collections::HashSet;

/// The outcome of [`fix_tree_duplicates`].
#[derive(Debug, Clone, PartialEq)]
pub struct TreeFix {
    pub tree: DocumentTree,
    pub modified: bool,
}

/// A repeated identifier inside a tree, addressed by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeDuplicate {
    pub path: String,
    pub message: String,
}

fn record_id(record: &DocumentTree, policy: &IdPolicy) -> Option<i64> {
    record.get(&policy.id_key)?.as_integer()
}

/// Renumbers repeated integer ids in the record list, continuing from the
/// largest one present. The first use of each id keeps it.
pub fn fix_tree_duplicates(tree: &DocumentTree, policy: &IdPolicy) -> TreeFix {
    let mut fixed = tree.clone();
    let modified = match &mut fixed {
        DocumentTree::Object(map) => match map.get_mut(&policy.records_key) {
            Some(DocumentTree::Sequence(records)) => renumber_repeats(records, policy),
            _ => false,
        },
        _ => false,
    };
    TreeFix {
        tree: fixed,
        modified,
    }
}

fn renumber_repeats(records: &mut [DocumentTree], policy: &IdPolicy) -> bool {
    let mut max_id = records
        .iter()
        .filter_map(|record| record_id(record, policy))
        .fold(0, i64::max);
    let mut seen = HashSet::new();
    let mut modified = false;

    for record in records.iter_mut() {
        let Some(id) = record_id(record, policy) else {
            continue;
        };
        if seen.insert(id) {
            continue;
        }
        let Some(next) = max_id.checked_add(1) else {
            log::warn!("no numeric id left above {max_id}; record with id {id} kept as is");
            continue;
        };
        max_id = next;
        if let DocumentTree::Object(fields) = record {
            fields.insert(policy.id_key.clone(), DocumentTree::Integer(next));
            modified = true;
        }
    }
    modified
}

/// Reports every record whose integer id was already used by an earlier one.
pub fn validate_tree_duplicates(tree: &DocumentTree, policy: &IdPolicy) -> Vec<TreeDuplicate> {
    let Some(records) = tree
        .get(&policy.records_key)
        .and_then(DocumentTree::as_sequence)
    else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let id = record_id(record, policy)?;
            (!seen.insert(id)).then(|| TreeDuplicate {
                path: format!("/{}/{index}/{}", policy.records_key, policy.id_key),
                message: format!("Duplicate ID found: {id}. IDs must be unique."),
            })
        })
        .collect()
}
