//! Gofill AST Module - tree-sitter based access to Go source
//!
//! This crate parses Go files with error recovery, finds the chain of nodes
//! enclosing a byte range, and exposes the handful of node kinds completion
//! logic needs through typed views.

pub mod error;
pub mod provider;
pub mod tree;
pub mod types;
pub mod views;

pub use error::AstError;
pub use error::AstResult;
pub use provider::SyntaxProvider;
pub use tree::ParsedFile;
pub use tree::SyntaxNode;
pub use types::Diagnostic;
pub use types::TextRange;
pub use views::BlockView;
pub use views::ConditionalView;
pub use views::DeclItem;
pub use views::FileView;
pub use views::HeaderBindings;
pub use views::NodeKind;
pub use views::SelectorView;
pub use views::Statement;
pub use views::TypeSwitchView;
