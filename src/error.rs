use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum IdGuardError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownFormat(#[from] UnknownFormat),
}

/// Errors from the position-tracking JSON parser.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Unexpected token")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
    },

    #[error("Unexpected end of file")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The document ended unexpectedly. The parser expected more tokens.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("Document ended unexpectedly here")]
        span: SourceSpan,
    },

    #[error("Invalid token")]
    #[diagnostic(
        code(parser::invalid_token),
        help("This is not valid JSON: check for unclosed strings, bad escapes, malformed numbers or comments.")
    )]
    InvalidToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Could not read a token here")]
        span: SourceSpan,
    },

    #[error("Nesting too deep")]
    #[diagnostic(
        code(parser::nesting_too_deep),
        help("Objects and arrays may be nested at most {limit} levels deep.")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("This container exceeds the nesting limit")]
        span: SourceSpan,
        limit: usize,
    },
}

/// Errors from decoding or encoding a document tree.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ConvertError {
    #[error("JSON error: {0}")]
    #[diagnostic(code(convert::json))]
    Json(String),

    #[error("YAML error: {0}")]
    #[diagnostic(code(convert::yaml))]
    Yaml(String),

    #[error("XML error: {0}")]
    #[diagnostic(code(convert::xml))]
    Xml(String),

    #[error("Invalid XML element name: {name:?}")]
    #[diagnostic(
        code(convert::invalid_xml_name),
        help("XML element and attribute names must start with a letter or underscore.")
    )]
    InvalidXmlName { name: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid JSON policy: {0}")]
    #[diagnostic(code(config::json))]
    Json(String),

    #[error("Invalid YAML policy: {0}")]
    #[diagnostic(code(config::yaml))]
    Yaml(String),
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Unknown document format: {tag:?}")]
#[diagnostic(code(format::unknown), help("Supported formats are json, yaml and xml."))]
pub struct UnknownFormat {
    pub tag: String,
}

/// A repeated identifier, reported against the document it was found in.
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("Duplicate ID found: {value}. IDs must be unique.")]
#[diagnostic(
    code(fixer::duplicate_id),
    help("Every record needs its own identifier. Apply the proposed fix or pick an unused value.")
)]
pub struct DuplicateIdDiagnostic {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("first used here")]
    pub first: SourceSpan,
    #[label("used again here")]
    pub duplicate: SourceSpan,
    pub value: String,
}
