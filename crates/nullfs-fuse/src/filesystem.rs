//! FUSE filesystem implementation over [`FsOperations`].
//!
//! This module implements the fuser `Filesystem` trait. Each kernel request
//! is resolved from inode numbers to namespace paths through the
//! [`InodeTable`], dispatched to the operations object, and answered with
//! attributes synthesized from the returned [`Attributes`].
//!
//! The request logic lives in inherent methods returning [`FuseResult`];
//! the trait impl only unpacks arguments and writes replies.

use crate::config::MountConfig;
use crate::error::{FuseError, FuseResult};
use crate::inode::{InodeTable, ROOT_INODE};

use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyWrite, Request, TimeOrNow,
};
use libc::c_int;
use nullfs_core::{Attributes, EntryKind, FsCapacity, FsOperations, NsPath, NullDriver, OpStats};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace};

/// Preferred I/O size reported in attributes.
const BLOCK_SIZE: u32 = 4096;

/// One entry of a directory listing as handed to the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u64,
    pub file_type: FileType,
    pub name: String,
}

/// FUSE filesystem backed by a content-free namespace.
pub struct NullFS<O: FsOperations = NullDriver> {
    /// Verb implementation.
    ops: O,
    /// Inode table for path/inode mapping.
    inodes: InodeTable,
    config: MountConfig,
    /// Counters logged on unmount, when the operations object exposes them.
    stats: Option<Arc<OpStats>>,
    uid: u32,
    gid: u32,
}

impl NullFS<NullDriver> {
    /// Creates a filesystem over a fresh [`NullDriver`] built from
    /// `config.namespace`.
    pub fn new(config: MountConfig) -> Self {
        let driver = NullDriver::with_config(config.namespace.clone());
        let stats = driver.stats();
        Self::with_operations(driver, config).with_stats(stats)
    }
}

impl<O: FsOperations> NullFS<O> {
    /// Creates a filesystem over any [`FsOperations`] implementation.
    ///
    /// Entries are reported as owned by the mounting user.
    pub fn with_operations(ops: O, config: MountConfig) -> Self {
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };
        Self {
            ops,
            inodes: InodeTable::new(),
            config,
            stats: None,
            uid,
            gid,
        }
    }

    /// Attaches counters to be logged when the filesystem is destroyed.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<OpStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Overrides the reported owner.
    #[must_use]
    pub fn with_ownership(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    pub fn operations(&self) -> &O {
        &self.ops
    }

    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    // ==================== Helpers ====================

    /// Builds the kernel attribute record for `inode`.
    ///
    /// No timestamps are tracked; every time field is the epoch.
    pub fn make_attr(&self, inode: u64, attr: &Attributes) -> FileAttr {
        FileAttr {
            ino: inode,
            size: attr.size,
            blocks: 0,
            atime: UNIX_EPOCH,
            mtime: UNIX_EPOCH,
            ctime: UNIX_EPOCH,
            crtime: UNIX_EPOCH,
            kind: file_type(attr.kind),
            perm: attr.perm,
            nlink: attr.nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }

    fn resolve(&self, inode: u64) -> FuseResult<NsPath> {
        self.inodes
            .path_of(inode)
            .ok_or(FuseError::InvalidInode(inode))
    }

    /// Path of `name` inside the directory bound to `parent`.
    fn child_path(&self, parent: u64, name: &OsStr) -> FuseResult<NsPath> {
        let name = name
            .to_str()
            .ok_or_else(|| FuseError::InvalidName(name.to_string_lossy().into_owned()))?;
        Ok(self.resolve(parent)?.join(name))
    }

    /// Attributes for `path`, counting one kernel lookup on its inode.
    fn entry_attr(&self, path: NsPath) -> FuseResult<FileAttr> {
        let attr = self.ops.getattr(&path)?;
        let inode = self.inodes.get_or_insert(path);
        Ok(self.make_attr(inode, &attr))
    }

    // ==================== Request logic ====================

    pub fn lookup_entry(&self, parent: u64, name: &OsStr) -> FuseResult<FileAttr> {
        let path = self.child_path(parent, name)?;
        self.entry_attr(path)
    }

    pub fn get_attr(&self, inode: u64) -> FuseResult<FileAttr> {
        let path = self.resolve(inode)?;
        let attr = self.ops.getattr(&path)?;
        Ok(self.make_attr(inode, &attr))
    }

    /// Applies each requested change, then reports fresh attributes.
    #[allow(clippy::too_many_arguments)]
    pub fn set_attr(
        &self,
        inode: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
    ) -> FuseResult<FileAttr> {
        let path = self.resolve(inode)?;
        if let Some(size) = size {
            self.ops.truncate(&path, size)?;
        }
        if let Some(mode) = mode {
            self.ops.chmod(&path, mode)?;
        }
        if uid.is_some() || gid.is_some() {
            self.ops.chown(&path, uid, gid)?;
        }
        if atime.is_some() || mtime.is_some() {
            self.ops
                .utimens(&path, atime.map(resolve_time), mtime.map(resolve_time))?;
        }
        let attr = self.ops.getattr(&path)?;
        Ok(self.make_attr(inode, &attr))
    }

    pub fn open_file(&self, inode: u64) -> FuseResult<()> {
        let path = self.resolve(inode)?;
        Ok(self.ops.open(&path)?)
    }

    /// Reads from the file bound to `inode`. Stored files hold no bytes, so
    /// the read buffer starts empty.
    pub fn read_file(&self, inode: u64, offset: u64) -> FuseResult<Vec<u8>> {
        let path = self.resolve(inode)?;
        let mut buf = Vec::new();
        let n = self.ops.read(&path, &mut buf, offset)?;
        buf.truncate(n);
        Ok(buf)
    }

    pub fn write_file(&self, inode: u64, offset: u64, data: &[u8]) -> FuseResult<usize> {
        let path = self.resolve(inode)?;
        Ok(self.ops.write(&path, data, offset)?)
    }

    /// Full listing of the directory bound to `inode`, markers first.
    pub fn list_directory(&self, inode: u64) -> FuseResult<Vec<DirEntry>> {
        let path = self.resolve(inode)?;
        let parent_inode = if path.is_root() {
            ROOT_INODE
        } else {
            self.inodes
                .get_inode(&NsPath::new(path.parent()))
                .unwrap_or(ROOT_INODE)
        };

        let entries = self
            .ops
            .readdir(&path)?
            .into_iter()
            .map(|entry| {
                let inode = match entry.name.as_str() {
                    "." => inode,
                    ".." => parent_inode,
                    name => self.inodes.assign(path.join(name)),
                };
                DirEntry {
                    inode,
                    file_type: file_type(entry.kind),
                    name: entry.name,
                }
            })
            .collect();
        Ok(entries)
    }

    pub fn make_node(
        &self,
        parent: u64,
        name: &OsStr,
        mode: u32,
        rdev: u32,
    ) -> FuseResult<FileAttr> {
        let path = self.child_path(parent, name)?;
        self.ops.mknod(&path, mode, rdev)?;
        self.entry_attr(path)
    }

    pub fn make_dir(&self, parent: u64, name: &OsStr, mode: u32) -> FuseResult<FileAttr> {
        let path = self.child_path(parent, name)?;
        self.ops.mkdir(&path, mode)?;
        self.entry_attr(path)
    }

    pub fn create_file(&self, parent: u64, name: &OsStr, mode: u32) -> FuseResult<FileAttr> {
        let path = self.child_path(parent, name)?;
        self.ops.create(&path, mode)?;
        self.entry_attr(path)
    }

    pub fn remove_file(&self, parent: u64, name: &OsStr) -> FuseResult<()> {
        let path = self.child_path(parent, name)?;
        self.ops.unlink(&path)?;
        self.inodes.invalidate_path(&path);
        Ok(())
    }

    pub fn remove_dir(&self, parent: u64, name: &OsStr) -> FuseResult<()> {
        let path = self.child_path(parent, name)?;
        self.ops.rmdir(&path)?;
        self.inodes.invalidate_path(&path);
        Ok(())
    }

    pub fn rename_entry(
        &self,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
    ) -> FuseResult<()> {
        let src = self.child_path(parent, name)?;
        let dst = self.child_path(newparent, newname)?;
        self.ops.rename(&src, &dst)?;
        self.inodes.rename_path(&src, dst);
        Ok(())
    }

    pub fn capacity(&self) -> FuseResult<FsCapacity> {
        Ok(self.ops.statfs()?)
    }
}

fn file_type(kind: EntryKind) -> FileType {
    match kind {
        EntryKind::Directory => FileType::Directory,
        EntryKind::RegularFile => FileType::RegularFile,
    }
}

fn resolve_time(t: TimeOrNow) -> SystemTime {
    match t {
        TimeOrNow::SpecificTime(t) => t,
        TimeOrNow::Now => SystemTime::now(),
    }
}

/// Kernel offsets are signed; anything negative is rejected.
fn offset_from(offset: i64) -> FuseResult<u64> {
    u64::try_from(offset).map_err(|_| FuseError::InvalidOffset(offset))
}

impl<O: FsOperations> Filesystem for NullFS<O> {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!(fsname = %self.config.fsname, "FUSE filesystem initialized");
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(stats) = &self.stats {
            let snapshot = stats.snapshot();
            info!(
                total_ops = snapshot.total_ops(),
                bytes_discarded = snapshot.bytes_discarded,
                not_found = snapshot.not_found,
                "FUSE filesystem destroyed"
            );
        } else {
            info!("FUSE filesystem destroyed");
        }
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        trace!(parent = parent, name = ?name, "lookup");
        match self.lookup_entry(parent, name) {
            Ok(attr) => reply.entry(&self.config.attr_ttl, &attr, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, nlookup: u64) {
        trace!(inode = ino, nlookup = nlookup, "forget");
        self.inodes.forget(ino, nlookup);
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!(inode = ino, "getattr");
        match self.get_attr(ino) {
            Ok(attr) => reply.attr(&self.config.attr_ttl, &attr),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        trace!(
            inode = ino,
            mode = ?mode,
            uid = ?uid,
            gid = ?gid,
            size = ?size,
            "setattr"
        );
        match self.set_attr(ino, mode, uid, gid, size, atime, mtime) {
            Ok(attr) => reply.attr(&self.config.attr_ttl, &attr),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!(inode = ino, flags = flags, "open");
        // No per-handle state exists, so every handle is 0
        match self.open_file(ino) {
            Ok(()) => reply.opened(0, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!(inode = ino, offset = offset, size = size, "read");
        match offset_from(offset).and_then(|offset| self.read_file(ino, offset)) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        trace!(inode = ino, offset = offset, len = data.len(), "write");
        match offset_from(offset).and_then(|offset| self.write_file(ino, offset, data)) {
            Ok(n) => reply.written(u32::try_from(n).unwrap_or(u32::MAX)),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn flush(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _lock_owner: u64,
        reply: ReplyEmpty,
    ) {
        trace!(inode = ino, "flush");
        reply.ok();
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        trace!(inode = ino, "release");
        reply.ok();
    }

    fn fsync(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        datasync: bool,
        reply: ReplyEmpty,
    ) {
        trace!(inode = ino, datasync = datasync, "fsync");
        reply.ok();
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        trace!(inode = ino, "opendir");
        match self.resolve(ino) {
            Ok(_) => reply.opened(0, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!(inode = ino, offset = offset, "readdir");

        let entries = match self.list_directory(ino) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        let skip = usize::try_from(offset).unwrap_or(0);
        for (i, entry) in entries.iter().enumerate().skip(skip) {
            // buffer.add returns true if buffer is full
            if reply.add(entry.inode, (i + 1) as i64, entry.file_type, &entry.name) {
                break;
            }
        }

        reply.ok();
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: fuser::ReplyStatfs) {
        match self.capacity() {
            Ok(cap) => {
                debug!(fsid = cap.fsid, total_bytes = cap.total_bytes(), "statfs");
                reply.statfs(
                    cap.blocks,
                    cap.blocks_free,
                    cap.blocks_available,
                    cap.files,
                    cap.files_free,
                    cap.block_size,
                    cap.name_max,
                    cap.block_size,
                );
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    // ==================== Namespace mutations ====================

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        rdev: u32,
        reply: ReplyEntry,
    ) {
        trace!(parent = parent, name = ?name, mode = mode, "mknod");
        match self.make_node(parent, name, mode, rdev) {
            Ok(attr) => reply.entry(&self.config.attr_ttl, &attr, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        trace!(parent = parent, name = ?name, "mkdir");
        match self.make_dir(parent, name, mode) {
            Ok(attr) => reply.entry(&self.config.attr_ttl, &attr, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _flags: i32,
        reply: fuser::ReplyCreate,
    ) {
        trace!(parent = parent, name = ?name, "create");
        match self.create_file(parent, name, mode) {
            Ok(attr) => reply.created(&self.config.attr_ttl, &attr, 0, 0, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        trace!(parent = parent, name = ?name, "unlink");
        match self.remove_file(parent, name) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        trace!(parent = parent, name = ?name, "rmdir");
        match self.remove_dir(parent, name) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        trace!(
            parent = parent,
            name = ?name,
            newparent = newparent,
            newname = ?newname,
            "rename"
        );
        match self.rename_entry(parent, name, newparent, newname) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }
}
