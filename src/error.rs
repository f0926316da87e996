//! Error types for bayesets.

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Crate error type.
///
/// Build and load failures are fatal and reported immediately; query-time
/// input problems (unknown ids) are tolerated and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure on one of the index files
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Misuse of the raw index writer
    #[error("index build error: {0}")]
    Build(String),

    /// The on-disk index directory fails validation
    #[error("corrupt index at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// A query honoured its cancellation signal; no partial results exist
    #[error("query cancelled")]
    Cancelled,
}

impl Error {
    /// Create an I/O error tagged with the offending path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    /// Create a build error
    pub fn build(msg: impl Into<String>) -> Self {
        Error::Build(msg.into())
    }

    /// Create a corrupt-index error
    pub fn corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Corrupt { path: path.into(), reason: reason.into() }
    }
}
