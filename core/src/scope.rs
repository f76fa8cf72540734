//! Names visible at a cursor, collected from its enclosing syntax path.

use crate::catalog::PackageCatalog;
use crate::catalog::PackageEntry;
use gofill_ast::DeclItem;
use gofill_ast::NodeKind;
use gofill_ast::Statement;
use gofill_ast::SyntaxNode;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Variable,
    Package,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry<'c> {
    pub name: String,
    pub kind: ScopeKind,
    /// Set for [`ScopeKind::Package`] entries only.
    pub package: Option<&'c PackageEntry>,
}

/// Flat name table. The first insert of a name wins, so inner scopes must be
/// added before outer ones.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable<'c> {
    entries: HashMap<String, ScopeEntry<'c>>,
}

impl<'c> ScopeTable<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ScopeEntry<'c>> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScopeEntry<'c>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns false when `name` was already bound.
    pub fn insert(
        &mut self,
        name: &str,
        kind: ScopeKind,
        package: Option<&'c PackageEntry>,
    ) -> bool {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ScopeEntry {
                    name: name.to_string(),
                    kind,
                    package,
                });
                true
            }
        }
    }

    fn insert_items(&mut self, items: Vec<DeclItem<'_>>, catalog: &'c PackageCatalog) {
        for item in items {
            match item {
                DeclItem::Value { names, .. } => {
                    for name in names {
                        self.insert(name, ScopeKind::Variable, None);
                    }
                }
                DeclItem::Type { name, .. } => {
                    self.insert(name, ScopeKind::Type, None);
                }
                DeclItem::Import { alias, path } => {
                    // Imports the catalog does not know stay invisible.
                    let Some(package) = catalog.package(&path) else {
                        continue;
                    };
                    match alias {
                        Some("_" | ".") => {}
                        Some(alias) => {
                            self.insert(alias, ScopeKind::Package, Some(package));
                        }
                        None => {
                            self.insert(package.short_name(), ScopeKind::Package, Some(package));
                        }
                    }
                }
                DeclItem::Function { .. } | DeclItem::Method { .. } => {}
            }
        }
    }
}

/// Build the scope table for `path`, ordered innermost first and ending at
/// the file root.
///
/// Only statements that end before the path enters a block are visible, and
/// header bindings of `if`/`switch` only once the path has left the header.
pub fn resolve_scope<'c>(path: &[SyntaxNode<'_>], catalog: &'c PackageCatalog) -> ScopeTable<'c> {
    let mut table = ScopeTable::new();

    for pair in path.windows(2) {
        let (child, node) = (pair[0], pair[1]);
        let before = child.range().start;

        match node.kind() {
            NodeKind::Block(block) => {
                for statement in block.statements().into_iter().rev() {
                    if statement.range().end > before {
                        continue;
                    }
                    match statement.statement() {
                        Statement::Declaration(items) => table.insert_items(items, catalog),
                        Statement::Define(names) => {
                            for name in names {
                                table.insert(name, ScopeKind::Variable, None);
                            }
                        }
                        Statement::Assign | Statement::Other => {}
                    }
                }
            }
            NodeKind::Conditional(view) => {
                if let Some(bindings) = view.bindings() {
                    if before >= bindings.end {
                        for name in bindings.names {
                            table.insert(name, ScopeKind::Variable, None);
                        }
                    }
                }
            }
            NodeKind::TypeSwitch(view) => {
                if let Some(bindings) = view.bindings() {
                    if before >= bindings.end {
                        for name in bindings.names {
                            table.insert(name, ScopeKind::Variable, None);
                        }
                    }
                }
            }
            NodeKind::File(file) => table.insert_items(file.declarations(), catalog),
            NodeKind::Selector(_) | NodeKind::Identifier(_) | NodeKind::Other => {}
        }
    }

    tracing::trace!(names = table.len(), "resolved scope");
    table
}
