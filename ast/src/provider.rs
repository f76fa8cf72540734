//! Parser management for Go source text.
//!
//! The provider is the only place that talks to the tree-sitter parser. It is
//! stateless apart from the grammar handle, so one instance can be shared by
//! any number of threads.

use crate::error::AstError;
use crate::error::AstResult;
use crate::tree::ParsedFile;
use crate::types::Diagnostic;
use crate::types::TextRange;
use std::path::Path;
use tree_sitter::Node;
use tree_sitter::Parser;

/// Longest snippet of offending source quoted in a diagnostic message.
const MAX_SNIPPET_CHARS: usize = 32;

/// Parses Go source into a [`ParsedFile`] with error recovery.
#[derive(Clone)]
pub struct SyntaxProvider {
    language: tree_sitter::Language,
}

impl std::fmt::Debug for SyntaxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxProvider")
            .field("language", &"go")
            .finish()
    }
}

impl SyntaxProvider {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// True for files the provider should be handed when scanning a tree.
    pub fn is_source_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("go")
    }

    fn create_parser(&self) -> AstResult<Parser> {
        // Parser is neither Clone nor Sync, so every parse gets its own.
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AstError::LanguageError(e.to_string()))?;
        Ok(parser)
    }

    /// Parse source text. Syntax errors never fail the parse; they are
    /// reported through [`ParsedFile::diagnostics`].
    pub fn parse(&self, source: impl Into<String>) -> AstResult<ParsedFile> {
        let source = source.into();
        let mut parser = self.create_parser()?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| AstError::ParserError("Failed to parse source code".to_string()))?;

        let diagnostics = collect_diagnostics(tree.root_node(), &source);
        if !diagnostics.is_empty() {
            tracing::trace!(count = diagnostics.len(), "recovered from syntax errors");
        }

        Ok(ParsedFile::new(tree, source, diagnostics))
    }
}

impl Default for SyntaxProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order walk reporting every ERROR and MISSING node in document order.
/// Children of an ERROR node are not inspected.
fn collect_diagnostics(root: Node<'_>, source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if !root.has_error() {
        return diagnostics;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let mut descend = node.has_error();

        if node.is_error() {
            diagnostics.push(unexpected(node, source));
            descend = false;
        } else if node.is_missing() {
            diagnostics.push(Diagnostic::new(
                TextRange::new(node.start_byte(), node.end_byte()),
                format!("syntax error: missing {:?}", node.kind()),
            ));
            descend = false;
        }

        if descend && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return diagnostics;
            }
        }
    }
}

fn unexpected(node: Node<'_>, source: &str) -> Diagnostic {
    let range = TextRange::new(node.start_byte(), node.end_byte());
    let snippet: String = source
        .get(node.byte_range())
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .take(MAX_SNIPPET_CHARS)
        .collect();

    if snippet.is_empty() {
        Diagnostic::new(range, "syntax error: unexpected end of input")
    } else {
        Diagnostic::new(range, format!("syntax error: unexpected {snippet:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_file_detection() {
        assert!(SyntaxProvider::is_source_file(&PathBuf::from("fmt/print.go")));
        assert!(SyntaxProvider::is_source_file(&PathBuf::from("print_test.go")));
        assert!(!SyntaxProvider::is_source_file(&PathBuf::from("README.md")));
        assert!(!SyntaxProvider::is_source_file(&PathBuf::from("go")));
    }

    #[test]
    fn test_parsing_clean_source() {
        let provider = SyntaxProvider::new();
        let parsed = provider
            .parse("package main\n\nfunc main() {}\n")
            .unwrap();

        assert_eq!(parsed.root().kind_name(), "source_file");
        assert!(!parsed.has_errors());
        assert!(parsed.diagnostics().is_empty());
    }

    #[test]
    fn test_parsing_recovers_from_errors() {
        let provider = SyntaxProvider::new();
        let source = "package main\n\nfunc main() {\n\tx := \n}\n\nfunc other() {}\n";
        let parsed = provider.parse(source).unwrap();

        assert!(parsed.has_errors());
        assert!(
            parsed
                .diagnostics()
                .iter()
                .all(|d| d.message.starts_with("syntax error:"))
        );
        // The declaration after the broken one is still in the tree.
        assert!(parsed.source().contains("other"));
        assert_eq!(parsed.package_name(), Some("main"));
    }

    #[test]
    fn test_diagnostics_are_in_document_order() {
        let provider = SyntaxProvider::new();
        let source = "package main\n\nfunc a() { x := }\n\nfunc b() { y := }\n";
        let parsed = provider.parse(source).unwrap();

        let starts: Vec<usize> = parsed.diagnostics().iter().map(|d| d.range.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert!(!starts.is_empty());
    }
}
