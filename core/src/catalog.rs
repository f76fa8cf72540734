//! Package catalog: exported declarations per import path plus the short
//! name index used to guess packages that are not imported.
//!
//! [`CatalogBuilder`] is the mutable side, fed one parsed file at a time.
//! [`CatalogBuilder::freeze`] turns it into a [`PackageCatalog`], which has no
//! mutating methods and can be shared across threads behind an `Arc`.

use gofill_ast::DeclItem;
use gofill_ast::ParsedFile;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Value,
    Type,
    Function,
}

/// A top-level name declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Doc comment text, empty when there is none.
    pub doc: String,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(name: impl Into<String>, doc: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            kind,
        }
    }

    /// Visible outside its package, i.e. the name starts with an uppercase letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    short_name: String,
    declarations: Vec<Declaration>,
}

impl PackageEntry {
    /// The name from the `package` clause of the first file seen.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Declarations in scan order. Not deduplicated.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

/// Accumulates declarations before the catalog is frozen.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    packages: HashMap<String, PackageEntry>,
    short_names: HashMap<String, BTreeSet<String>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's top-level declarations into the package at
    /// `import_path`. Methods and imports are not recorded. Adding the same
    /// file twice records its declarations twice.
    pub fn add_file(&mut self, import_path: &str, file: &ParsedFile) {
        let Some(package_name) = file.package_name() else {
            tracing::debug!(import_path, "file has no package clause; skipping");
            return;
        };

        self.short_names
            .entry(package_name.to_string())
            .or_default()
            .insert(import_path.to_string());

        let entry = self
            .packages
            .entry(import_path.to_string())
            .or_insert_with(|| PackageEntry {
                short_name: package_name.to_string(),
                declarations: Vec::new(),
            });

        for item in file.declarations() {
            match item {
                DeclItem::Value { names, doc } => {
                    let doc = doc.unwrap_or_default();
                    entry.declarations.extend(
                        names
                            .into_iter()
                            .map(|name| Declaration::new(name, doc.as_str(), DeclKind::Value)),
                    );
                }
                DeclItem::Type { name, doc } => {
                    entry.declarations.push(Declaration::new(
                        name,
                        doc.unwrap_or_default(),
                        DeclKind::Type,
                    ));
                }
                DeclItem::Function { name, doc } => {
                    entry.declarations.push(Declaration::new(
                        name,
                        doc.unwrap_or_default(),
                        DeclKind::Function,
                    ));
                }
                DeclItem::Import { .. } | DeclItem::Method { .. } => {}
            }
        }
    }

    pub fn freeze(self) -> PackageCatalog {
        PackageCatalog {
            packages: self.packages,
            short_names: self.short_names,
        }
    }
}

/// Read-only snapshot produced by [`CatalogBuilder::freeze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageCatalog {
    packages: HashMap<String, PackageEntry>,
    short_names: HashMap<String, BTreeSet<String>>,
}

impl PackageCatalog {
    pub fn package(&self, import_path: &str) -> Option<&PackageEntry> {
        self.packages.get(import_path)
    }

    /// Every import path whose package is called `short_name`.
    pub fn import_paths_for(&self, short_name: &str) -> Option<&BTreeSet<String>> {
        self.short_names.get(short_name)
    }

    /// Distinct package names, in no particular order.
    pub fn short_names(&self) -> impl Iterator<Item = &str> {
        self.short_names.keys().map(String::as_str)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &PackageEntry)> {
        self.packages.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn declaration_count(&self) -> usize {
        self.packages.values().map(|p| p.declarations.len()).sum()
    }
}
