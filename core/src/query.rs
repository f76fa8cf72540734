//! Completion queries against a frozen [`PackageCatalog`].
//!
//! A query parses the snippet from scratch, finds the path of nodes around
//! the cursor and dispatches on the node next to the leaf: a selector goes to
//! package member search, a bare identifier to scope search. Nothing is
//! cached between queries and no I/O happens, so one engine serves any number
//! of threads.

use crate::catalog::PackageCatalog;
use crate::catalog::PackageEntry;
use crate::scope::ScopeKind;
use crate::scope::ScopeTable;
use crate::scope::resolve_scope;
use crate::types::CompletionResult;
use crate::types::Suggestion;
use gofill_ast::Diagnostic;
use gofill_ast::NodeKind;
use gofill_ast::ParsedFile;
use gofill_ast::SelectorView;
use gofill_ast::SyntaxProvider;
use gofill_ast::TextRange;
use std::sync::Arc;
use tracing::debug;

/// Identifier inserted after a trailing `.` so the selector parses.
pub const PLACEHOLDER: char = 'X';

#[derive(Debug, Clone)]
pub struct QueryEngine {
    catalog: Arc<PackageCatalog>,
    provider: SyntaxProvider,
}

/// Where the cursor landed in the tree.
enum Placement {
    Nested(Vec<Suggestion>),
    /// Directly below the file. `recovered` when inside a recovery node.
    TopLevel { recovered: bool },
}

/// Result of filtering names by a typed prefix.
enum Matches {
    Found(Vec<Suggestion>),
    /// Some name equals the prefix exactly; nothing is suggested.
    Exact,
}

impl Matches {
    fn into_suggestions(self) -> Vec<Suggestion> {
        match self {
            Matches::Found(found) => found,
            Matches::Exact => Vec::new(),
        }
    }
}

impl QueryEngine {
    pub fn new(catalog: Arc<PackageCatalog>) -> Self {
        Self {
            catalog,
            provider: SyntaxProvider::new(),
        }
    }

    pub fn catalog(&self) -> &PackageCatalog {
        &self.catalog
    }

    /// Suggestions for the cursor at byte `offset` of `src`. Callers keep
    /// `offset` within `0..=src.len()` and on a char boundary.
    pub fn query(&self, src: &str, offset: usize) -> CompletionResult {
        let offset = offset.min(src.len());
        let patched = needs_placeholder(src, offset);

        let text = if patched {
            let mut text = String::with_capacity(src.len() + PLACEHOLDER.len_utf8());
            text.push_str(src.get(..offset).unwrap_or(src));
            text.push(PLACEHOLDER);
            text.push_str(src.get(offset..).unwrap_or(""));
            text
        } else {
            src.to_string()
        };

        let parsed = match self.provider.parse(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!("query parse failed: {err}");
                return CompletionResult::default();
            }
        };

        let diagnostics = parsed
            .diagnostics()
            .iter()
            .map(|d| unpatch(d, offset, patched))
            .collect();

        let mut suggestions = match self.suggest_in(&parsed, offset, patched) {
            Placement::Nested(found) => found,
            Placement::TopLevel { recovered: true } => self.retry_closed(&parsed, offset, patched),
            Placement::TopLevel { recovered: false } => {
                debug!(offset, "cursor at top level");
                Vec::new()
            }
        };

        suggestions.sort_by(|a, b| a.name.cmp(&b.name));
        CompletionResult {
            suggestions,
            related: Vec::new(),
            diagnostics,
        }
    }

    fn suggest_in(&self, parsed: &ParsedFile, offset: usize, patched: bool) -> Placement {
        let len = parsed.source().len();
        let window = TextRange::new(offset.saturating_sub(1), (offset + 1).min(len));
        let path = parsed.enclosing_path(window);

        if path.len() <= 2 {
            let recovered = path.iter().any(|node| node.kind_name() == "ERROR");
            return Placement::TopLevel { recovered };
        }

        let scope = resolve_scope(&path, &self.catalog);
        let found = match (path[0].kind(), path[1].kind()) {
            (_, NodeKind::Selector(selector)) => {
                let (primary, secondary) = selector_parts(selector, offset, patched);
                debug!(primary, secondary, "selector search");
                self.selector_search(&scope, primary, secondary, offset)
            }
            (NodeKind::Identifier(prefix), _) => {
                debug!(prefix, "scope search");
                self.scope_search(&scope, prefix, offset)
            }
            _ => Vec::new(),
        };
        Placement::Nested(found)
    }

    /// A buffer cut off inside a body recovers as one top-level error node.
    /// Close the open blocks after the text and look again; the cursor and
    /// everything before it keep their offsets.
    fn retry_closed(&self, parsed: &ParsedFile, offset: usize, patched: bool) -> Vec<Suggestion> {
        let depth = open_blocks(parsed.source());
        if depth == 0 {
            return Vec::new();
        }

        let mut text = parsed.source().to_string();
        for _ in 0..depth {
            text.push_str("\n}");
        }
        debug!(offset, depth, "closing open blocks");
        match self.provider.parse(text) {
            Ok(closed) => match self.suggest_in(&closed, offset, patched) {
                Placement::Nested(found) => found,
                Placement::TopLevel { .. } => Vec::new(),
            },
            Err(err) => {
                tracing::warn!("query parse failed: {err}");
                Vec::new()
            }
        }
    }

    /// Names in scope starting with `prefix`, or, when none do, known package
    /// names starting with it.
    fn scope_search(&self, scope: &ScopeTable<'_>, prefix: &str, at: usize) -> Vec<Suggestion> {
        let in_scope = filter_prefix(
            scope.entries().map(|e| (e.name.as_str(), None)),
            prefix,
            at,
        );
        match in_scope {
            Matches::Found(found) if found.is_empty() => filter_prefix(
                self.catalog.short_names().map(|name| (name, None)),
                prefix,
                at,
            )
            .into_suggestions(),
            other => other.into_suggestions(),
        }
    }

    fn selector_search(
        &self,
        scope: &ScopeTable<'_>,
        primary: &str,
        secondary: &str,
        at: usize,
    ) -> Vec<Suggestion> {
        if let Some(entry) = scope.get(primary) {
            return match (entry.kind, entry.package) {
                (ScopeKind::Package, Some(package)) => member_search(package, secondary, at),
                _ => Vec::new(),
            };
        }

        // Not imported: guess only when the name is unambiguous.
        match self.catalog.import_paths_for(primary) {
            Some(paths) if paths.len() == 1 => paths
                .iter()
                .next()
                .and_then(|path| self.catalog.package(path))
                .map(|package| member_search(package, secondary, at))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

fn member_search(package: &PackageEntry, secondary: &str, at: usize) -> Vec<Suggestion> {
    filter_prefix(
        package
            .declarations()
            .iter()
            .filter(|d| d.is_exported())
            .map(|d| (d.name.as_str(), Some(d.doc.as_str()).filter(|doc| !doc.is_empty()))),
        secondary,
        at,
    )
    .into_suggestions()
}

fn filter_prefix<'a>(
    candidates: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    prefix: &str,
    at: usize,
) -> Matches {
    let mut found = Vec::new();
    for (name, doc) in candidates {
        if name == prefix {
            return Matches::Exact;
        }
        if name.starts_with(prefix) {
            found.push(Suggestion::new(at, name, doc.map(str::to_string)));
        }
    }
    Matches::Found(found)
}

/// Operand name and typed member prefix of a selector. The placeholder
/// member reads as an empty prefix.
fn selector_parts<'t>(
    selector: SelectorView<'t>,
    offset: usize,
    patched: bool,
) -> (&'t str, &'t str) {
    let primary = selector.operand_name().unwrap_or("");
    let secondary = match selector.member() {
        Some(member) if !(patched && member.range().start == offset) => member.text(),
        _ => "",
    };
    (primary, secondary)
}

/// Braces opened and not closed, outside comments and literals.
fn open_blocks(src: &str) -> usize {
    let mut depth = 0usize;
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if chars.peek() == Some(&'/') => {
                chars.by_ref().take_while(|&c| c != '\n').for_each(drop);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '`' => chars.by_ref().take_while(|&c| c != '`').for_each(drop),
            '"' | '\'' => {
                let mut escaped = false;
                for next in chars.by_ref() {
                    match next {
                        '\n' => break,
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        _ if next == c => break,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    depth
}

/// The cursor follows a `.` and no identifier starts after it.
fn needs_placeholder(src: &str, offset: usize) -> bool {
    let before = src.get(..offset).and_then(|s| s.chars().next_back());
    let after = src.get(offset..).and_then(|s| s.chars().next());
    before == Some('.') && !after.is_some_and(is_identifier_start)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Map a diagnostic from the patched text back onto the caller's text.
fn unpatch(diagnostic: &Diagnostic, offset: usize, patched: bool) -> Diagnostic {
    if !patched {
        return diagnostic.clone();
    }
    let shift = |pos: usize| if pos > offset { pos - 1 } else { pos };
    Diagnostic::new(
        TextRange::new(shift(diagnostic.range.start), shift(diagnostic.range.end)),
        diagnostic.message.clone(),
    )
}
