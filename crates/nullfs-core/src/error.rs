//! Error type for namespace operations.
//!
//! The driver has exactly one failure mode: an operation required a path to
//! be known as a file or directory and it was not. Everything else succeeds.

use thiserror::Error;

/// Errors returned by [`FsOperations`](crate::ops::FsOperations).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NullFsError {
    /// Path is neither a known file nor a known directory.
    #[error("No such file or directory: {path}")]
    NotFound { path: String },
}

impl NullFsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        NullFsError::NotFound { path: path.into() }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            NullFsError::NotFound { path } => path,
        }
    }
}

/// Result type for namespace operations.
pub type NullFsResult<T> = Result<T, NullFsError>;
