//! Error handling and errno mapping for the FUSE bridge.
//!
//! The namespace engine reports a single failure kind; the bridge adds the
//! failures that only exist at the kernel boundary (stale inodes, names that
//! are not UTF-8) and folds everything into a libc error code.

use nullfs_core::NullFsError;
use std::io;
use thiserror::Error;

/// Errors surfaced while servicing a FUSE request.
#[derive(Debug, Error)]
pub enum FuseError {
    /// The namespace engine rejected the request.
    #[error(transparent)]
    Namespace(#[from] NullFsError),

    /// IO error while mounting or reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The kernel referenced an inode the table does not know.
    #[error("Invalid inode: {0}")]
    InvalidInode(u64),

    /// A configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A directory entry name was not valid UTF-8.
    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    /// The kernel passed a negative file offset.
    #[error("Invalid offset: {0}")]
    InvalidOffset(i64),
}

impl FuseError {
    /// Converts this error to a libc error code for FUSE.
    pub fn to_errno(&self) -> i32 {
        match self {
            FuseError::Namespace(e) => e.to_errno(),
            FuseError::Io(e) => e.to_errno(),
            FuseError::InvalidInode(_) => libc::ENOENT,
            FuseError::Config(_) | FuseError::InvalidName(_) | FuseError::InvalidOffset(_) => {
                libc::EINVAL
            }
        }
    }
}

/// Result type for FUSE operations.
pub type FuseResult<T> = Result<T, FuseError>;

/// Extension trait to convert errors to errno.
pub trait ToErrno {
    /// Converts this error to a libc error code.
    fn to_errno(&self) -> i32;
}

impl ToErrno for NullFsError {
    fn to_errno(&self) -> i32 {
        match self {
            NullFsError::NotFound { .. } => libc::ENOENT,
        }
    }
}

impl ToErrno for io::Error {
    fn to_errno(&self) -> i32 {
        self.raw_os_error().unwrap_or(libc::EIO)
    }
}
