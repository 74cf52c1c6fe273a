pub mod api;
pub mod ast;
pub mod config;
pub mod converter;
pub mod error;
pub mod fixer;
pub mod format;
pub mod lexer;
pub mod locator;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod mapping;
pub mod parser;
pub mod records;
pub mod tree;
pub mod utils;
mod xml;

pub use api::{analyze, analyze_with_policy, Analysis};
pub use config::{IdPolicy, StringConflictStrategy};
pub use converter::{convert, parse, serialize, try_serialize};
pub use error::{ConfigError, ConvertError, IdGuardError, ParserError, UnknownFormat};
pub use fixer::{
    find_duplicates, find_fixable_duplicates, sort_for_application, DuplicateFixer, DuplicateId,
    FixableRange,
};
pub use format::{detect_format, Format};
pub use locator::{
    get_read_only_ranges, locate_identifiers, IdOccurrence, IdValue, IdentifierLocator, SourceRange,
};
pub use mapping::{restore_ids_by_label, LabelIdMap, RestoreSummary};
pub use records::{fix_tree_duplicates, validate_tree_duplicates};
pub use tree::DocumentTree;
