//! Position-annotated JSON syntax tree. Offsets are byte positions into the
//! source text, `pos_end` exclusive.

use miette::SourceSpan;

#[derive(Debug, PartialEq, Clone)]
pub struct JsonDocument {
    pub root: JsonValue,
}

#[derive(Debug, PartialEq, Clone)]
pub struct JsonValue {
    pub kind: JsonValueKind,
    pub pos_start: usize,
    pub pos_end: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub enum JsonValueKind {
    String(String),
    /// The literal as written, so large or exact integers survive untouched.
    Number(String),
    Boolean(bool),
    Null,
    Object(Vec<Property>),
    Array(Vec<JsonValue>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Property {
    pub key: String,
    pub key_start: usize,
    pub key_end: usize,
    pub value: JsonValue,
}

impl JsonValue {
    pub fn get_source_span(&self) -> SourceSpan {
        (self.pos_start, self.pos_end - self.pos_start).into()
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            JsonValueKind::Object(_) | JsonValueKind::Array(_)
        )
    }
}
