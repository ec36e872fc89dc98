use std::io;

use thiserror::Error;

/// Everything that can go wrong inside the library. Scripts usually see these
/// through `anyhow`, by way of `?`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A header line that would corrupt the header section: an empty name, a
    /// name containing `:` or whitespace, or a value containing CR or LF.
    #[error("invalid response header {name:?}")]
    InvalidHeader { name: String },
    /// Script output with no blank line between headers and body.
    #[error("CGI output has no header/body separator")]
    MissingSeparator,
    #[error("unable to start CGI program {program:?}: {source}")]
    Spawn { program: String, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
