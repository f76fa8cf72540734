//! Query results as returned to callers and serialized for the front end.

use gofill_ast::Diagnostic;
use gofill_ast::TextRange;
use serde::Deserialize;
use serde::Serialize;

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Always a zero-width insertion point at the cursor.
    pub range: TextRange,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Suggestion {
    pub fn new(at: usize, name: impl Into<String>, doc: Option<String>) -> Self {
        Self {
            range: TextRange::empty(at),
            name: name.into(),
            doc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Sorted by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,

    /// Reserved; never populated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<TextRange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl CompletionResult {
    /// Suggested names in result order.
    pub fn names(&self) -> Vec<&str> {
        self.suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
