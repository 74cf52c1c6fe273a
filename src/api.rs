use crate::config::IdPolicy;
use crate::converter;
use crate::fixer::{duplicates_in, DuplicateFixer, DuplicateId, FixableRange};
use crate::format::{detect_format, Format};
use crate::locator::IdOccurrence;
use serde::Serialize;

/// Everything known about a document's identifiers after one pass.
///
/// This is what an editor host asks for on every debounced change: the spans
/// to lock, the duplicates to flag, and the edits to offer. It serializes to
/// JSON so it can cross a process or FFI boundary unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub format: Format,
    pub occurrences: Vec<IdOccurrence>,
    pub duplicates: Vec<DuplicateId>,
    /// Unsorted; see [`crate::fixer::sort_for_application`].
    pub fixes: Vec<FixableRange>,
    /// Why the document failed to parse as a whole, if it did. The other
    /// fields still hold what the heuristics could find.
    pub parse_error: Option<String>,
}

impl Analysis {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Serializes the analysis into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the analysis into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Analyzes a document under the default [`IdPolicy`]. The format is sniffed
/// from the text when not given.
#[must_use]
pub fn analyze(text: &str, format: Option<Format>) -> Analysis {
    analyze_with_policy(text, format, &IdPolicy::default())
}

#[must_use]
pub fn analyze_with_policy(text: &str, format: Option<Format>, policy: &IdPolicy) -> Analysis {
    let format = format.unwrap_or_else(|| detect_format(text));
    let fixer = DuplicateFixer::new(policy.clone());
    let occurrences = fixer.locator().locate(text, format);
    let duplicates = duplicates_in(&occurrences);

    let parse_error = converter::parse(text, format).err().map(|err| err.to_string());
    let fixes = if parse_error.is_some() && policy.require_parseable {
        Vec::new()
    } else {
        fixer.plan_fixes(&occurrences)
    };

    Analysis {
        format,
        occurrences,
        duplicates,
        fixes,
        parse_error,
    }
}
