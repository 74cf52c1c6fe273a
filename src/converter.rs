//! Parses whole documents into a [`DocumentTree`] and writes them back out in
//! any supported format.
//!
//! XML needs a single root element, so the serializer wraps trees that would
//! otherwise produce several, and the parser strips that wrapper again. The
//! pair keeps JSON→XML→JSON and XML→JSON→XML stable on shape.

use crate::error::{ConvertError, IdGuardError, UnknownFormat};
use crate::format::Format;
use crate::tree::DocumentTree;
use crate::xml::{self, ATTRIBUTE_PREFIX, TEXT_KEY};
use indexmap::IndexMap;
use log::warn;

const ROOT_KEY: &str = "root";
const ITEM_KEY: &str = "item";

/// Parses `text` as `format`.
///
/// # Errors
/// Returns a [`ConvertError`] carrying the decoder's message when the text is
/// not well-formed.
pub fn parse(text: &str, format: Format) -> Result<DocumentTree, ConvertError> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|e| ConvertError::Json(e.to_string())),
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| ConvertError::Yaml(e.to_string())),
        Format::Xml => xml::decode(text).map(unwrap_xml_document),
    }
}

/// Like [`parse`], for callers holding a raw format tag.
///
/// # Errors
/// Returns [`IdGuardError::UnknownFormat`] for an unsupported tag, or the
/// parse error.
pub fn parse_by_tag(text: &str, tag: &str) -> Result<DocumentTree, IdGuardError> {
    let format: Format = tag.parse()?;
    Ok(parse(text, format)?)
}

/// Serializes `tree` as `format`.
///
/// # Errors
/// Returns a [`ConvertError`] when the tree cannot be represented, such as a
/// key that is not a valid XML name.
pub fn try_serialize(tree: &DocumentTree, format: Format) -> Result<String, ConvertError> {
    match format {
        Format::Json => {
            serde_json::to_string_pretty(tree).map_err(|e| ConvertError::Json(e.to_string()))
        }
        Format::Yaml => serde_yaml::to_string(tree).map_err(|e| ConvertError::Yaml(e.to_string())),
        Format::Xml => xml::encode(&wrap_for_xml(tree)),
    }
}

/// Serializes `tree` as `format`. A failure comes back as the error's text so
/// it can be shown in place of the document.
pub fn serialize(tree: &DocumentTree, format: Format) -> String {
    try_serialize(tree, format).unwrap_or_else(|err| {
        warn!("serializing to {format} failed: {err}");
        err.to_string()
    })
}

/// Like [`serialize`]. An unknown tag produces empty output.
pub fn serialize_by_tag(tree: &DocumentTree, tag: &str) -> String {
    match Format::from_tag(tag) {
        Some(format) => serialize(tree, format),
        None => {
            warn!("{}", UnknownFormat { tag: tag.to_string() });
            String::new()
        }
    }
}

/// Parses `text` as `from` and serializes the result as `to`.
///
/// # Errors
/// Only parsing can fail; serialization problems are returned as text, the
/// way [`serialize`] does.
pub fn convert(text: &str, from: Format, to: Format) -> Result<String, ConvertError> {
    let tree = parse(text, from)?;
    Ok(serialize(&tree, to))
}

/// Removes a synthetic `root` wrapper: `{root: X}` becomes `X` when `X` is a
/// container. Anything else is returned unchanged.
pub fn flatten_root(tree: DocumentTree) -> DocumentTree {
    match tree {
        DocumentTree::Object(mut map) if is_root_wrapper(&map) => match map.shift_remove(ROOT_KEY)
        {
            Some(inner) => inner,
            None => DocumentTree::Object(map),
        },
        other => other,
    }
}

fn is_root_wrapper(map: &IndexMap<String, DocumentTree>) -> bool {
    map.len() == 1 && map.get(ROOT_KEY).is_some_and(DocumentTree::is_container)
}

/// Undoes what [`wrap_for_xml`] adds after decoding.
fn unwrap_xml_document(tree: DocumentTree) -> DocumentTree {
    let DocumentTree::Object(map) = tree else {
        return tree;
    };
    // `<root/>` or `<root></root>` is an empty document.
    if map.len() == 1 && map.get(ROOT_KEY) == Some(&DocumentTree::String(String::new())) {
        return DocumentTree::Object(IndexMap::new());
    }
    // `item` only stands for sequence entries inside a synthetic root.
    if !is_root_wrapper(&map) {
        return DocumentTree::Object(map);
    }
    match flatten_root(DocumentTree::Object(map)) {
        DocumentTree::Object(mut map) if map.len() == 1 && map.contains_key(ITEM_KEY) => {
            match map.shift_remove(ITEM_KEY) {
                Some(DocumentTree::Sequence(items)) => DocumentTree::Sequence(items),
                Some(single) => DocumentTree::Sequence(vec![single]),
                None => DocumentTree::Object(map),
            }
        }
        other => other,
    }
}

/// Shapes a tree so it encodes to exactly one root element.
fn wrap_for_xml(tree: &DocumentTree) -> DocumentTree {
    let flattened = flatten_root(tree.clone());
    match flattened {
        DocumentTree::Sequence(items) => {
            let mut inner = IndexMap::new();
            inner.insert(ITEM_KEY.to_string(), DocumentTree::Sequence(items));
            wrap_in_root(DocumentTree::Object(inner))
        }
        DocumentTree::Object(map) if needs_root(&map) => wrap_in_root(DocumentTree::Object(map)),
        DocumentTree::Object(map) => DocumentTree::Object(map),
        scalar => wrap_in_root(scalar),
    }
}

fn needs_root(map: &IndexMap<String, DocumentTree>) -> bool {
    match map.iter().next() {
        Some((key, value)) if map.len() == 1 => {
            if key == ROOT_KEY {
                return false;
            }
            matches!(value, DocumentTree::Sequence(_))
                || key.starts_with(ATTRIBUTE_PREFIX)
                || key == TEXT_KEY
        }
        _ => true,
    }
}

fn wrap_in_root(tree: DocumentTree) -> DocumentTree {
    let mut root = IndexMap::new();
    root.insert(ROOT_KEY.to_string(), tree);
    DocumentTree::Object(root)
}
