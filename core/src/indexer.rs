//! Concurrent construction of a [`PackageCatalog`] from a source tree.
//!
//! Every directory below the root is one package, keyed by its slash
//! separated path relative to the root. Directories are scanned as tasks of
//! one rayon scope, each directory spawning a task per subdirectory; the scope
//! returning is the join barrier after which the catalog is frozen.
//! Files are picked the way a Go build would: [`BuildContext`] filters on
//! platform suffixes and build constraints, and files starting with `_` or
//! `.` are left out. Entries are visited in name order, so the first file of a
//! package is stable across runs. Unreadable directories and files, and files
//! with syntax errors, are skipped and only show up in the logs.

use crate::catalog::CatalogBuilder;
use crate::catalog::PackageCatalog;
use crate::config::IndexerConfig;
use crate::constraint::BuildContext;
use gofill_ast::SyntaxProvider;
use parking_lot::Mutex;
use rayon::Scope;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Indexer {
    config: IndexerConfig,
    context: BuildContext,
    provider: SyntaxProvider,
}

impl Indexer {
    pub fn new(config: IndexerConfig) -> Self {
        Self {
            context: BuildContext::from_config(&config),
            config,
            provider: SyntaxProvider::new(),
        }
    }

    pub const fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub const fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Scan `root` and return the frozen catalog. Blocks until every
    /// directory below `root` has been processed.
    pub fn build(&self, root: &Path) -> PackageCatalog {
        let builder = Mutex::new(CatalogBuilder::new());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("gofill-index-{i}"))
            .build();
        match pool {
            Ok(pool) => pool.scope(|s| self.scan_dir(s, root.to_path_buf(), None, &builder)),
            Err(err) => {
                warn!("failed to create index thread pool, using the global pool: {err}");
                rayon::scope(|s| self.scan_dir(s, root.to_path_buf(), None, &builder));
            }
        }

        let catalog = builder.into_inner().freeze();
        info!(
            root = %root.display(),
            packages = catalog.len(),
            declarations = catalog.declaration_count(),
            "package catalog built"
        );
        catalog
    }

    /// Index the files of `dir` and spawn a task per subdirectory. The root
    /// has no import path and its files are ignored.
    fn scan_dir<'s>(
        &'s self,
        scope: &Scope<'s>,
        dir: PathBuf,
        import_path: Option<String>,
        builder: &'s Mutex<CatalogBuilder>,
    ) {
        let listing = match std::fs::read_dir(&dir) {
            Ok(listing) => listing,
            Err(err) => {
                warn!(dir = %dir.display(), "skipping unreadable directory: {err}");
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in listing {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(dir = %dir.display(), "failed to list directory entry: {err}"),
            }
        }
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            // Symlinks report neither dir nor file here and are not followed.
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if file_type.is_dir() {
                if is_ignored_dir(name) {
                    continue;
                }
                let child_import = match &import_path {
                    Some(parent) => format!("{parent}/{name}"),
                    None => name.to_string(),
                };
                let path = entry.path();
                scope.spawn(move |s| self.scan_dir(s, path, Some(child_import), builder));
            } else if file_type.is_file() {
                if let Some(import_path) = &import_path {
                    if self.is_package_file(name) {
                        self.index_file(&entry.path(), name, import_path, builder);
                    }
                }
            }
        }
    }

    fn is_package_file(&self, name: &str) -> bool {
        SyntaxProvider::is_source_file(Path::new(name))
            && !name.starts_with(['_', '.'])
            && (self.config.include_tests || !name.ends_with("_test.go"))
            && self.context.matches_file_name(name)
    }

    fn index_file(
        &self,
        path: &Path,
        name: &str,
        import_path: &str,
        builder: &Mutex<CatalogBuilder>,
    ) {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                debug!(path = %path.display(), "skipping unreadable file: {err}");
                return;
            }
        };
        if !self.context.matches_header(&source) {
            debug!(path = %path.display(), "excluded by build constraints");
            return;
        }

        let parsed = match self.provider.parse(source) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(path = %path.display(), "skipping file: {err}");
                return;
            }
        };
        if parsed.has_errors() {
            debug!(
                path = %path.display(),
                errors = parsed.diagnostics().len(),
                "skipping file with syntax errors"
            );
            return;
        }
        // External test packages are separate packages.
        if name.ends_with("_test.go")
            && parsed.package_name().is_some_and(|p| p.ends_with("_test"))
        {
            debug!(path = %path.display(), "skipping external test package");
            return;
        }

        // Parse outside the lock; only the merge is serialized.
        builder.lock().add_file(import_path, &parsed);
        debug!(path = %path.display(), import_path, "indexed file");
    }
}

/// Hidden directories, directories starting with a digit, and `testdata`.
fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with(|c: char| c.is_ascii_digit()) || name == "testdata"
}
