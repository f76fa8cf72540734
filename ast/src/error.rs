//! Error types for syntax operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstError {
    #[error("Failed to load Go grammar: {0}")]
    LanguageError(String),

    #[error("Parser error: {0}")]
    ParserError(String),
}

pub type AstResult<T> = Result<T, AstError>;
