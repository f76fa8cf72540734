use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GofillError>;

#[derive(Error, Debug)]
pub enum GofillError {
    #[error("failed to read {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigDecode(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("index root {0} is not a directory")]
    NotADirectory(PathBuf),
}
