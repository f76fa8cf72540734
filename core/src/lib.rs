//! Gofill core: package catalog construction, lexical scope resolution and
//! completion queries over Go source.
//!
//! The usual flow is [`Indexer::build`] once per process, then any number of
//! concurrent [`QueryEngine::query`] calls sharing the frozen catalog.

pub mod catalog;
pub mod config;
pub mod constraint;
pub mod error;
pub mod indexer;
pub mod query;
pub mod scope;
pub mod types;

pub use catalog::CatalogBuilder;
pub use catalog::DeclKind;
pub use catalog::Declaration;
pub use catalog::PackageCatalog;
pub use catalog::PackageEntry;
pub use config::GofillConfig;
pub use config::IndexerConfig;
pub use config::ServerConfig;
pub use constraint::BuildContext;
pub use error::GofillError;
pub use error::Result;
pub use indexer::Indexer;
pub use query::QueryEngine;
pub use scope::ScopeEntry;
pub use scope::ScopeKind;
pub use scope::ScopeTable;
pub use scope::resolve_scope;
pub use types::CompletionResult;
pub use types::Suggestion;
