//! Error types for pattern compilation and directory traversal.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raised when an ignore pattern is not a valid regular expression.
///
/// Compilation is all-or-nothing, so receiving this error means no pattern
/// set was built. The pattern has to be fixed; retrying will not help.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not compile pattern \"{pattern}\": {message}, at {offset}")]
pub struct PatternCompileError {
    /// The pattern string exactly as the caller supplied it.
    pub pattern: String,
    /// The syntax error reported by the regex parser.
    pub message: String,
    /// Character (not byte) offset into `pattern` where parsing failed.
    /// Failures that are not tied to a position, such as exceeding the
    /// compiled size limit, report 0.
    pub offset: usize,
}

/// Raised while walking when the filesystem refuses to cooperate.
///
/// The walker yields this once and then stops; unreadable subtrees are never
/// skipped silently.
#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TraversalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TraversalError::Io {
            path: path.into(),
            source,
        }
    }

    /// The path the walker was working on when it failed.
    pub fn path(&self) -> &Path {
        match self {
            TraversalError::NotADirectory { path } | TraversalError::Io { path, .. } => path,
        }
    }

    /// The underlying OS error kind, if the failure came from an I/O call.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            TraversalError::NotADirectory { .. } => None,
            TraversalError::Io { source, .. } => Some(source.kind()),
        }
    }
}

/// Crate-level error for callers that compile and walk in a single step.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Pattern(#[from] PatternCompileError),

    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

pub type Result<T> = std::result::Result<T, Error>;
