use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("no package root: pass --root, set index.root in the config file, or set GOROOT")]
    MissingRoot,

    #[error("no cursor: pass --offset or mark the cursor with '‸'")]
    MissingCursor,

    #[error("offset {offset} is outside the {len}-byte input")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("failed to listen on {addr}: {message}")]
    Listen { addr: String, message: String },

    #[error(transparent)]
    Core(#[from] gofill_core::GofillError),
}
