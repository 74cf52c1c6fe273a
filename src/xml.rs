//! XML codec for [`DocumentTree`].
//!
//! Elements decode into objects keyed by child name. Attributes become `@_`
//! prefixed keys, and text mixed with structure lands under `#text`. Repeated
//! siblings collect into a sequence. Encoding reverses this. Root wrapping is
//! the converter's job, not this module's.

use crate::error::ConvertError;
use crate::parser::MAX_NESTING_DEPTH;
use crate::tree::DocumentTree;
use crate::utils::looks_numeric;
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

pub const ATTRIBUTE_PREFIX: &str = "@_";
pub const TEXT_KEY: &str = "#text";

/// An element still waiting for its end tag.
struct OpenElement {
    name: String,
    attributes: IndexMap<String, DocumentTree>,
    children: IndexMap<String, DocumentTree>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>) -> Result<Self, ConvertError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ConvertError::Xml(format!("Invalid attribute in <{name}>: {e}")))?;
            let key = format!(
                "{ATTRIBUTE_PREFIX}{}",
                String::from_utf8_lossy(attr.key.as_ref())
            );
            let value = attr
                .unescape_value()
                .map_err(|e| ConvertError::Xml(format!("Invalid attribute value in <{name}>: {e}")))?;
            attributes.insert(key, coerce_scalar(&value));
        }
        Ok(Self {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, DocumentTree) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, coerce_scalar(text));
        }
        let mut object = self.attributes;
        for (key, value) in self.children {
            insert_child(&mut object, key, value);
        }
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), coerce_scalar(text));
        }
        (self.name, DocumentTree::Object(object))
    }
}

/// Adds a child under `name`, turning repeated names into a sequence.
fn insert_child(map: &mut IndexMap<String, DocumentTree>, name: String, value: DocumentTree) {
    match map.get_mut(&name) {
        Some(DocumentTree::Sequence(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = DocumentTree::Sequence(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

/// Text content becomes a boolean or number when it looks like one.
pub(crate) fn coerce_scalar(text: &str) -> DocumentTree {
    let text = text.trim();
    match text {
        "true" => return DocumentTree::Bool(true),
        "false" => return DocumentTree::Bool(false),
        _ => {}
    }
    if looks_numeric(text) {
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(n) = text.parse::<i64>() {
                return DocumentTree::Integer(n);
            }
        }
        if let Ok(f) = text.parse::<f64>() {
            return DocumentTree::Float(f);
        }
    }
    DocumentTree::String(text.to_string())
}

/// Decodes an XML document into an object keyed by its top-level element
/// names. Comments, declarations, processing instructions and doctypes are
/// skipped.
pub fn decode(text: &str) -> Result<DocumentTree, ConvertError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut document = IndexMap::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(ConvertError::Xml(format!(
                        "Elements nested deeper than {MAX_NESTING_DEPTH} levels at byte {}",
                        reader.buffer_position()
                    )));
                }
                stack.push(OpenElement::open(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let (name, value) = OpenElement::open(&e)?.close();
                let parent = match stack.last_mut() {
                    Some(open) => &mut open.children,
                    None => &mut document,
                };
                insert_child(parent, name, value);
            }
            Ok(Event::End(e)) => {
                let open = stack.pop().ok_or_else(|| {
                    ConvertError::Xml(format!(
                        "Unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                let (name, value) = open.close();
                let parent = match stack.last_mut() {
                    Some(open) => &mut open.children,
                    None => &mut document,
                };
                insert_child(parent, name, value);
            }
            Ok(Event::Text(e)) => {
                let content = e
                    .unescape()
                    .map_err(|err| ConvertError::Xml(format!("Invalid text content: {err}")))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&content);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ConvertError::Xml(format!(
                    "{e} at byte {}",
                    reader.error_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::Xml(format!(
            "Unexpected end of document: missing closing tag </{}>",
            open.name
        )));
    }

    Ok(DocumentTree::Object(document))
}

/// Encodes a tree as indented XML. Each key of a top-level object becomes a
/// top-level element; any other tree is written as a single `<root>`.
pub fn encode(tree: &DocumentTree) -> Result<String, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    match tree {
        DocumentTree::Object(map) => {
            for (key, value) in map {
                write_element(&mut writer, key, value)?;
            }
        }
        other => write_element(&mut writer, "root", other)?,
    }
    String::from_utf8(writer.into_inner()).map_err(|e| ConvertError::Xml(e.to_string()))
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &DocumentTree,
) -> Result<(), ConvertError> {
    check_name(name)?;
    match value {
        DocumentTree::Sequence(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        DocumentTree::Object(map) => {
            let mut start = BytesStart::new(name);
            let mut text = None;
            let mut children = Vec::new();
            for (key, child) in map {
                if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    check_name(attribute)?;
                    let content = scalar_content(key, child)?;
                    start.push_attribute((attribute, content.as_str()));
                } else if key == TEXT_KEY {
                    text = Some(scalar_content(key, child)?);
                } else {
                    children.push((key, child));
                }
            }
            if children.is_empty() && text.is_none() {
                return write_event(writer, Event::Empty(start));
            }
            write_event(writer, Event::Start(start))?;
            if let Some(text) = text {
                write_event(writer, Event::Text(BytesText::new(&text)))?;
            }
            for (key, child) in children {
                write_element(writer, key, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
        DocumentTree::Null => write_event(writer, Event::Empty(BytesStart::new(name))),
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            // An empty text event keeps the end tag on the same line.
            write_event(writer, Event::Text(BytesText::new(&text)))?;
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), ConvertError> {
    writer
        .write_event(event)
        .map_err(|e| ConvertError::Xml(format!("Write error: {e}")))
}

fn scalar_content(key: &str, value: &DocumentTree) -> Result<String, ConvertError> {
    value.scalar_text().ok_or_else(|| {
        ConvertError::Xml(format!(
            "{key:?} must hold a scalar, found a {}",
            value.kind_name()
        ))
    })
}

fn check_name(name: &str) -> Result<(), ConvertError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(ConvertError::InvalidXmlName {
            name: name.to_string(),
        })
    }
}
