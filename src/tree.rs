use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A format-neutral document: what every format parses into and serializes
/// from. Objects keep their keys in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DocumentTree {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<DocumentTree>),
    Object(IndexMap<String, DocumentTree>),
}

impl DocumentTree {
    pub fn is_container(&self) -> bool {
        matches!(self, DocumentTree::Sequence(_) | DocumentTree::Object(_))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, DocumentTree>> {
        match self {
            DocumentTree::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DocumentTree]> {
        match self {
            DocumentTree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentTree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DocumentTree::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Looks up `key` when this is an object.
    pub fn get(&self, key: &str) -> Option<&DocumentTree> {
        self.as_object()?.get(key)
    }

    /// The scalar as plain text, the way XML and map keys need it.
    /// Containers have no scalar text.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            DocumentTree::Null => Some(String::new()),
            DocumentTree::Bool(b) => Some(b.to_string()),
            DocumentTree::Integer(n) => Some(n.to_string()),
            DocumentTree::Float(f) => Some(f.to_string()),
            DocumentTree::String(s) => Some(s.clone()),
            DocumentTree::Sequence(_) | DocumentTree::Object(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DocumentTree::Null => "null",
            DocumentTree::Bool(_) => "boolean",
            DocumentTree::Integer(_) | DocumentTree::Float(_) => "number",
            DocumentTree::String(_) => "string",
            DocumentTree::Sequence(_) => "sequence",
            DocumentTree::Object(_) => "object",
        }
    }
}

impl From<serde_json::Value> for DocumentTree {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DocumentTree::Null,
            serde_json::Value::Bool(b) => DocumentTree::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => DocumentTree::Integer(i),
                None => DocumentTree::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => DocumentTree::String(s),
            serde_json::Value::Array(items) => {
                DocumentTree::Sequence(items.into_iter().map(DocumentTree::from).collect())
            }
            serde_json::Value::Object(map) => DocumentTree::Object(
                map.into_iter()
                    .map(|(k, v)| (k, DocumentTree::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for DocumentTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DocumentTree::Null => serializer.serialize_unit(),
            DocumentTree::Bool(b) => serializer.serialize_bool(*b),
            DocumentTree::Integer(n) => serializer.serialize_i64(*n),
            DocumentTree::Float(f) => serializer.serialize_f64(*f),
            DocumentTree::String(s) => serializer.serialize_str(s),
            DocumentTree::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DocumentTree::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DocumentTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentTreeVisitor)
    }
}

struct DocumentTreeVisitor;

impl<'de> Visitor<'de> for DocumentTreeVisitor {
    type Value = DocumentTree;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON or YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(DocumentTree::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DocumentTree::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(DocumentTree::Float(v as f64), DocumentTree::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(DocumentTree::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(DocumentTree::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(DocumentTree::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(DocumentTree::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(DocumentTree::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        DocumentTree::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DocumentTree::Sequence(items))
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<DocumentTree>()? {
            // YAML allows non-string scalar keys; they become their text.
            let key = key.scalar_text().ok_or_else(|| {
                de::Error::custom(format!("unsupported {} used as a mapping key", key.kind_name()))
            })?;
            let value = map.next_value()?;
            entries.insert(key, value);
        }
        Ok(DocumentTree::Object(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_decode_keeps_key_order() {
        let tree: DocumentTree = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = tree.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_number_kinds() {
        let tree: DocumentTree = serde_json::from_str("[1, -2, 1.5, 18446744073709551615]").unwrap();
        let items = tree.as_sequence().unwrap();
        assert_eq!(items[0], DocumentTree::Integer(1));
        assert_eq!(items[1], DocumentTree::Integer(-2));
        assert_eq!(items[2], DocumentTree::Float(1.5));
        assert!(matches!(items[3], DocumentTree::Float(_)));
    }

    #[test]
    fn test_yaml_non_string_keys() {
        let tree: DocumentTree = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        assert_eq!(tree.get("1"), Some(&DocumentTree::String("one".into())));
        assert_eq!(tree.get("true"), Some(&DocumentTree::String("yes".into())));
    }

    #[test]
    fn test_serialize_matches_json_value() {
        let value = json!({"b": [1, 2.5, null, true], "a": {"x": "y"}});
        let tree = DocumentTree::from(value.clone());
        let out = serde_json::to_string(&tree).unwrap();
        // `json!` objects are sorted by key, so the tree sees them sorted too.
        assert_eq!(out, r#"{"a":{"x":"y"},"b":[1,2.5,null,true]}"#);
        let back: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(DocumentTree::Integer(7).scalar_text().as_deref(), Some("7"));
        assert_eq!(DocumentTree::Null.scalar_text().as_deref(), Some(""));
        assert_eq!(DocumentTree::Sequence(vec![]).scalar_text(), None);
    }
}
