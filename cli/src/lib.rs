//! Front end for gofill: root discovery, cursor handling and the HTTP
//! completion handler shared by the `gofill` binary.

pub mod error;
pub mod server;

pub use error::CliError;
pub use error::Result;
pub use server::CompletionHandler;
pub use server::Reply;

use gofill_core::GofillError;
use gofill_core::IndexerConfig;
use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;

/// Cursor marker accepted by `gofill query` when no offset is given.
pub const CURSOR: char = '‸';

/// Pick the package root: the command-line flag, then the config file, then
/// `$GOROOT/src`.
pub fn resolve_root(
    flag: Option<&Path>,
    config: &IndexerConfig,
    goroot: Option<&OsStr>,
) -> Result<PathBuf> {
    let root = flag
        .map(Path::to_path_buf)
        .or_else(|| config.root.clone())
        .or_else(|| goroot.map(|g| Path::new(g).join("src")))
        .ok_or(CliError::MissingRoot)?;

    if !root.is_dir() {
        return Err(GofillError::NotADirectory(root).into());
    }
    Ok(root)
}

/// Source text and cursor for a query. Without an explicit offset the
/// cursor is the first `‸` in `src`, which is removed.
pub fn split_cursor(src: &str, offset: Option<usize>) -> Result<(String, usize)> {
    match offset {
        Some(offset) if offset > src.len() => Err(CliError::OffsetOutOfRange {
            offset,
            len: src.len(),
        }),
        Some(offset) => Ok((src.to_string(), clamp_offset(src, offset))),
        None => {
            let offset = src.find(CURSOR).ok_or(CliError::MissingCursor)?;
            Ok((src.replacen(CURSOR, "", 1), offset))
        }
    }
}

/// Clamp `offset` into `0..=src.len()` and back onto a char boundary.
pub fn clamp_offset(src: &str, offset: usize) -> usize {
    let mut offset = offset.min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
