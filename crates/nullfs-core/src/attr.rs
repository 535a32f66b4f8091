//! Synthetic attributes and filesystem capacity.
//!
//! No metadata is stored. Every known path gets the same fixed attributes for
//! its kind, and capacity figures are constants.

use crate::error::{NullFsError, NullFsResult};
use crate::namespace::Namespace;
use crate::path::NsPath;
use serde::{Deserialize, Serialize};

/// Permission bits reported for every directory (rwxrwxrwx).
pub const DIR_PERM: u16 = 0o777;

/// Permission bits reported for every file (rw-rw-rw-).
pub const FILE_PERM: u16 = 0o666;

/// Link count reported for directories.
pub const DIR_NLINK: u32 = 3;

/// Link count reported for files.
pub const FILE_NLINK: u32 = 1;

/// Kind of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    RegularFile,
}

/// Synthesized metadata for a known path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub kind: EntryKind,
    /// Always zero: no content is ever stored.
    pub size: u64,
    pub nlink: u32,
    pub perm: u16,
}

impl Attributes {
    pub const fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            size: 0,
            nlink: DIR_NLINK,
            perm: DIR_PERM,
        }
    }

    pub const fn file() -> Self {
        Self {
            kind: EntryKind::RegularFile,
            size: 0,
            nlink: FILE_NLINK,
            perm: FILE_PERM,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Produces attributes for `path`.
///
/// Directory membership (including the suffix heuristics) wins over file
/// membership. The file query goes through [`Namespace::is_file`], so an
/// unknown path becomes an empty file when auto-vivify is enabled.
pub fn attributes_of(ns: &mut Namespace, path: &NsPath) -> NullFsResult<Attributes> {
    if ns.is_directory(path) {
        Ok(Attributes::directory())
    } else if ns.is_file(path) {
        Ok(Attributes::file())
    } else {
        Err(NullFsError::not_found(path.as_str()))
    }
}

/// Block size reported by statfs (4 MiB).
pub const CAPACITY_BLOCK_SIZE: u32 = 4096 * 1024;

/// Total, free and available block counts (120 Mi blocks, about 480 TiB).
pub const CAPACITY_BLOCKS: u64 = 120 * 1024 * 1024;

/// Nominal inode count.
pub const CAPACITY_FILES: u64 = 1;

/// Filesystem id reported by statfs.
pub const CAPACITY_FSID: u64 = 99999;

/// Maximum filename length.
pub const CAPACITY_NAME_MAX: u32 = 255;

/// Fixed capacity figures returned by statfs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsCapacity {
    pub block_size: u32,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub files: u64,
    pub files_free: u64,
    pub fsid: u64,
    pub name_max: u32,
}

impl FsCapacity {
    /// Total bytes advertised.
    pub fn total_bytes(&self) -> u64 {
        self.blocks * u64::from(self.block_size)
    }
}

impl Default for FsCapacity {
    fn default() -> Self {
        Self {
            block_size: CAPACITY_BLOCK_SIZE,
            blocks: CAPACITY_BLOCKS,
            blocks_free: CAPACITY_BLOCKS,
            blocks_available: CAPACITY_BLOCKS,
            files: CAPACITY_FILES,
            files_free: CAPACITY_FILES,
            fsid: CAPACITY_FSID,
            name_max: CAPACITY_NAME_MAX,
        }
    }
}
