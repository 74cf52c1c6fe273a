use crate::error::UnknownFormat;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// The surface syntaxes a record document can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Xml,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Yaml, Format::Xml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
        }
    }

    /// Looks up a format by its tag. Unknown tags give `None` so callers can
    /// degrade to "nothing found" instead of failing.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_tag(s).ok_or_else(|| UnknownFormat { tag: s.to_string() })
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guesses the format of raw text from its first non-whitespace character.
/// YAML has no mandatory leading character, so it is the fallback.
pub fn detect_format(text: &str) -> Format {
    let trimmed = text.trim_start();
    if trimmed.starts_with('<') {
        Format::Xml
    } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Format::Json
    } else {
        Format::Yaml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("  [1,2,3]"), Format::Json);
        assert_eq!(detect_format("\n{\"a\": 1}"), Format::Json);
        assert_eq!(detect_format("<a/>"), Format::Xml);
        assert_eq!(detect_format("a: 1"), Format::Yaml);
        assert_eq!(detect_format(""), Format::Yaml);
    }

    #[test]
    fn test_format_tags() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!(Format::from_tag("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_tag("toml"), None);
        let err = "toml".parse::<Format>().unwrap_err();
        assert_eq!(err.tag, "toml");
        assert_eq!(Format::Xml.to_string(), "xml");
    }

    #[test]
    fn test_format_serde() {
        assert_eq!(serde_json::to_string(&Format::Yaml).unwrap(), "\"yaml\"");
        let parsed: Format = serde_json::from_str("\"xml\"").unwrap();
        assert_eq!(parsed, Format::Xml);
    }
}
