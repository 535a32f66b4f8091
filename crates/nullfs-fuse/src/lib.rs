//! FUSE bridge for nullfs.
//!
//! This crate mounts a [`nullfs_core`] namespace through the kernel FUSE
//! interface. Directory and file entries can be created, listed, renamed and
//! removed like on any filesystem; file contents are discarded on write and
//! read back as empty.
//!
//! # Usage
//!
//! ```ignore
//! use nullfs_fuse::{MountConfig, NullFS, spawn_mount};
//!
//! let config = MountConfig::default();
//! let session = spawn_mount(NullFS::new(config.clone()), "/mnt/null", &config)?;
//! // ... filesystem is live until the session is dropped
//! drop(session);
//! ```

pub mod config;
pub mod error;
pub mod filesystem;
pub mod inode;

pub use config::MountConfig;
pub use error::{FuseError, FuseResult, ToErrno};
pub use filesystem::{DirEntry, NullFS};
pub use inode::{InodeEntry, InodeTable, ROOT_INODE};

use fuser::BackgroundSession;
use nullfs_core::FsOperations;
use std::path::Path;
use tracing::info;

/// Mounts `fs` at `mountpoint` on a background thread.
///
/// The filesystem stays mounted until the returned session is dropped.
pub fn spawn_mount<O>(
    fs: NullFS<O>,
    mountpoint: impl AsRef<Path>,
    config: &MountConfig,
) -> FuseResult<BackgroundSession>
where
    O: FsOperations + 'static,
{
    let mountpoint = mountpoint.as_ref();
    let session = fuser::spawn_mount2(fs, mountpoint, &config.mount_options())?;
    info!(mountpoint = %mountpoint.display(), fsname = %config.fsname, "Filesystem mounted");
    Ok(session)
}
