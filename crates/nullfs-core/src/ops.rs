//! The filesystem-verb surface consumed by a call bridge.
//!
//! Every method takes a resolved absolute path plus verb-specific arguments
//! and returns a value or [`NullFsError::NotFound`](crate::error::NullFsError).
//! A bridge (see the `nullfs-fuse` crate) depends only on this trait and
//! converts errors into whatever status its host protocol uses.

use crate::attr::{Attributes, FsCapacity};
use crate::error::NullFsResult;
use crate::listing::DirListingEntry;
use crate::path::NsPath;
use std::time::SystemTime;

/// One method per filesystem verb.
///
/// Implementations must be safe to call from several bridge worker threads
/// at once.
pub trait FsOperations: Send + Sync {
    /// Synthesized attributes for `path`.
    fn getattr(&self, path: &NsPath) -> NullFsResult<Attributes>;

    /// Immediate children of `path`, starting with `.` and `..`.
    fn readdir(&self, path: &NsPath) -> NullFsResult<Vec<DirListingEntry>>;

    /// Checks that `path` is a file. No handle state is created.
    fn open(&self, path: &NsPath) -> NullFsResult<()>;

    /// Reads into `buf`. Returns the number of bytes transferred.
    fn read(&self, path: &NsPath, buf: &mut [u8], offset: u64) -> NullFsResult<usize>;

    /// Writes `data`. Returns the number of bytes accepted.
    fn write(&self, path: &NsPath, data: &[u8], offset: u64) -> NullFsResult<usize>;

    /// Creates a regular file entry.
    fn create(&self, path: &NsPath, mode: u32) -> NullFsResult<()>;

    /// Creates a node entry. Device numbers and node type are ignored.
    fn mknod(&self, path: &NsPath, mode: u32, rdev: u32) -> NullFsResult<()>;

    /// Creates a directory entry. The parent need not exist.
    fn mkdir(&self, path: &NsPath, mode: u32) -> NullFsResult<()>;

    /// Removes a file entry.
    fn unlink(&self, path: &NsPath) -> NullFsResult<()>;

    /// Removes a directory.
    fn rmdir(&self, path: &NsPath) -> NullFsResult<()>;

    /// Moves `src` to `dst`.
    fn rename(&self, src: &NsPath, dst: &NsPath) -> NullFsResult<()>;

    fn truncate(&self, path: &NsPath, size: u64) -> NullFsResult<()>;

    fn chmod(&self, path: &NsPath, mode: u32) -> NullFsResult<()>;

    fn chown(&self, path: &NsPath, uid: Option<u32>, gid: Option<u32>) -> NullFsResult<()>;

    fn utimens(
        &self,
        path: &NsPath,
        atime: Option<SystemTime>,
        mtime: Option<SystemTime>,
    ) -> NullFsResult<()>;

    /// Capacity figures for the whole filesystem.
    fn statfs(&self) -> NullFsResult<FsCapacity>;
}
