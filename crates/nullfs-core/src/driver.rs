//! The null driver: [`FsOperations`] over an in-memory [`Namespace`].
//!
//! All namespace access goes through one mutex, held for the whole of each
//! verb, so every call is atomic with respect to itself. Nothing here blocks
//! on I/O.

use crate::attr::{attributes_of, Attributes, FsCapacity};
use crate::config::{NullFsConfig, RmdirPolicy};
use crate::error::{NullFsError, NullFsResult};
use crate::listing::{list_children, DirListingEntry};
use crate::namespace::Namespace;
use crate::ops::FsOperations;
use crate::path::NsPath;
use crate::stats::OpStats;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, trace};

/// Content-free filesystem driver.
///
/// # Example
///
/// ```
/// use nullfs_core::{FsOperations, NsPath, NullDriver};
///
/// let driver = NullDriver::new();
/// driver.mkdir(&NsPath::new("/docs"), 0o755).unwrap();
/// driver.create(&NsPath::new("/docs/readme.txt"), 0o644).unwrap();
///
/// let written = driver.write(&NsPath::new("/docs/readme.txt"), b"hello", 0).unwrap();
/// assert_eq!(written, 5);
///
/// let mut buf = [0u8; 16];
/// let read = driver.read(&NsPath::new("/docs/readme.txt"), &mut buf, 0).unwrap();
/// assert_eq!(read, 0);
/// ```
pub struct NullDriver {
    namespace: Mutex<Namespace>,
    config: NullFsConfig,
    stats: Arc<OpStats>,
}

impl NullDriver {
    /// Creates a driver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(NullFsConfig::default())
    }

    pub fn with_config(config: NullFsConfig) -> Self {
        info!(
            auto_vivify_files = config.auto_vivify_files,
            rmdir_policy = ?config.rmdir_policy,
            "NullDriver initialized"
        );
        Self {
            namespace: Mutex::new(Namespace::with_auto_vivify(config.auto_vivify_files)),
            config,
            stats: Arc::new(OpStats::new()),
        }
    }

    pub fn config(&self) -> &NullFsConfig {
        &self.config
    }

    /// Shared handle to the operation counters.
    pub fn stats(&self) -> Arc<OpStats> {
        Arc::clone(&self.stats)
    }

    /// Runs `f` with the namespace locked.
    pub fn with_namespace<R>(&self, f: impl FnOnce(&Namespace) -> R) -> R {
        f(&*self.namespace.lock())
    }

    /// Directory-set membership or special suffix.
    pub fn is_directory(&self, path: &NsPath) -> bool {
        self.namespace.lock().is_directory(path)
    }

    /// File-set membership, subject to auto-vivify.
    pub fn is_file(&self, path: &NsPath) -> bool {
        self.namespace.lock().is_file(path)
    }

    /// Fails with NotFound unless `path` is a file.
    fn require_file(&self, ns: &mut Namespace, path: &NsPath) -> NullFsResult<()> {
        if ns.is_file(path) {
            Ok(())
        } else {
            self.stats.record_not_found();
            Err(NullFsError::not_found(path.as_str()))
        }
    }

    fn remove_file_entry(&self, path: &NsPath) {
        let removed = self.namespace.lock().remove_file(path);
        self.stats.record_removal();
        debug!(path = %path, removed, "File entry removed");
    }
}

impl Default for NullDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FsOperations for NullDriver {
    fn getattr(&self, path: &NsPath) -> NullFsResult<Attributes> {
        self.stats.record_lookup();
        let result = attributes_of(&mut self.namespace.lock(), path);
        if result.is_err() {
            self.stats.record_not_found();
        }
        result
    }

    fn readdir(&self, path: &NsPath) -> NullFsResult<Vec<DirListingEntry>> {
        self.stats.record_listing();
        let entries = list_children(&self.namespace.lock(), path);
        trace!(path = %path, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    fn open(&self, path: &NsPath) -> NullFsResult<()> {
        self.stats.record_open();
        self.require_file(&mut self.namespace.lock(), path)
    }

    fn read(&self, path: &NsPath, _buf: &mut [u8], _offset: u64) -> NullFsResult<usize> {
        self.stats.record_read();
        self.require_file(&mut self.namespace.lock(), path)?;
        Ok(0)
    }

    fn write(&self, path: &NsPath, data: &[u8], _offset: u64) -> NullFsResult<usize> {
        self.stats.record_write();
        self.require_file(&mut self.namespace.lock(), path)?;
        self.stats.record_discarded(data.len() as u64);
        Ok(data.len())
    }

    fn create(&self, path: &NsPath, _mode: u32) -> NullFsResult<()> {
        let inserted = self.namespace.lock().add_file(path);
        self.stats.record_create();
        debug!(path = %path, inserted, "File entry created");
        Ok(())
    }

    fn mknod(&self, path: &NsPath, mode: u32, _rdev: u32) -> NullFsResult<()> {
        self.create(path, mode)
    }

    fn mkdir(&self, path: &NsPath, _mode: u32) -> NullFsResult<()> {
        let inserted = self.namespace.lock().add_directory(path);
        self.stats.record_create();
        debug!(path = %path, inserted, "Directory entry created");
        Ok(())
    }

    fn unlink(&self, path: &NsPath) -> NullFsResult<()> {
        self.remove_file_entry(path);
        Ok(())
    }

    fn rmdir(&self, path: &NsPath) -> NullFsResult<()> {
        match self.config.rmdir_policy {
            RmdirPolicy::AliasUnlink => self.remove_file_entry(path),
            RmdirPolicy::RemoveDirectory => {
                let removed = self.namespace.lock().remove_directory(path);
                self.stats.record_removal();
                debug!(path = %path, removed, "Directory entry removed");
            }
        }
        Ok(())
    }

    fn rename(&self, src: &NsPath, dst: &NsPath) -> NullFsResult<()> {
        let mut ns = self.namespace.lock();
        if ns.is_directory(src) {
            ns.rename_directory(src, dst);
            debug!(src = %src, dst = %dst, "Directory entry renamed");
        } else if ns.is_file(src) {
            ns.rename_file(src, dst);
            debug!(src = %src, dst = %dst, "File entry renamed");
        } else {
            self.stats.record_not_found();
            return Err(NullFsError::not_found(src.as_str()));
        }
        self.stats.record_rename();
        Ok(())
    }

    fn truncate(&self, path: &NsPath, size: u64) -> NullFsResult<()> {
        trace!(path = %path, size, "truncate ignored");
        Ok(())
    }

    fn chmod(&self, path: &NsPath, mode: u32) -> NullFsResult<()> {
        trace!(path = %path, mode, "chmod ignored");
        Ok(())
    }

    fn chown(&self, path: &NsPath, uid: Option<u32>, gid: Option<u32>) -> NullFsResult<()> {
        trace!(path = %path, ?uid, ?gid, "chown ignored");
        Ok(())
    }

    fn utimens(
        &self,
        path: &NsPath,
        _atime: Option<SystemTime>,
        _mtime: Option<SystemTime>,
    ) -> NullFsResult<()> {
        trace!(path = %path, "utimens ignored");
        Ok(())
    }

    fn statfs(&self) -> NullFsResult<FsCapacity> {
        Ok(FsCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::EntryKind;

    fn p(s: &str) -> NsPath {
        NsPath::new(s)
    }

    #[test]
    fn test_open_requires_file() {
        let driver = NullDriver::new();
        assert!(driver.open(&p("/missing")).is_err());
        driver.create(&p("/present"), 0o644).unwrap();
        assert!(driver.open(&p("/present")).is_ok());
    }

    #[test]
    fn test_open_directory_is_not_found() {
        let driver = NullDriver::new();
        driver.mkdir(&p("/docs"), 0o755).unwrap();
        assert_eq!(
            driver.open(&p("/docs")),
            Err(NullFsError::not_found("/docs"))
        );
    }

    #[test]
    fn test_read_ignores_buffer() {
        let driver = NullDriver::new();
        driver.create(&p("/f"), 0o644).unwrap();
        let mut buf = [0xAAu8; 8];
        assert_eq!(driver.read(&p("/f"), &mut buf, 100).unwrap(), 0);
        assert_eq!(buf, [0xAA; 8]);
    }

    #[test]
    fn test_write_to_unknown_file() {
        let driver = NullDriver::new();
        assert!(driver.write(&p("/nope"), b"abc", 0).is_err());
        assert_eq!(driver.stats().snapshot().bytes_discarded, 0);
    }

    #[test]
    fn test_write_zero_bytes() {
        let driver = NullDriver::new();
        driver.create(&p("/f"), 0o644).unwrap();
        assert_eq!(driver.write(&p("/f"), &[], 0).unwrap(), 0);
    }

    #[test]
    fn test_mknod_creates_file() {
        let driver = NullDriver::new();
        driver.mknod(&p("/node"), 0o644, 0).unwrap();
        assert!(driver.is_file(&p("/node")));
        assert_eq!(driver.getattr(&p("/node")).unwrap().kind, EntryKind::RegularFile);
    }

    #[test]
    fn test_create_is_idempotent() {
        let driver = NullDriver::new();
        driver.create(&p("/f"), 0o644).unwrap();
        driver.create(&p("/f"), 0o644).unwrap();
        assert_eq!(driver.with_namespace(Namespace::file_count), 1);
    }

    #[test]
    fn test_unlink_absent_is_ok() {
        let driver = NullDriver::new();
        assert!(driver.unlink(&p("/never")).is_ok());
    }

    #[test]
    fn test_unlink_leaves_directories() {
        let driver = NullDriver::new();
        driver.mkdir(&p("/d"), 0o755).unwrap();
        driver.unlink(&p("/d")).unwrap();
        assert!(driver.is_directory(&p("/d")));
    }

    #[test]
    fn test_rmdir_aliases_unlink_by_default() {
        let driver = NullDriver::new();
        driver.mkdir(&p("/d"), 0o755).unwrap();
        driver.create(&p("/d"), 0o644).unwrap();

        driver.rmdir(&p("/d")).unwrap();

        assert!(driver.is_directory(&p("/d")));
        assert!(!driver.is_file(&p("/d")));
    }

    #[test]
    fn test_rmdir_remove_directory_policy() {
        let config = NullFsConfig::default().rmdir_policy(RmdirPolicy::RemoveDirectory);
        let driver = NullDriver::with_config(config);
        driver.mkdir(&p("/d"), 0o755).unwrap();
        driver.create(&p("/d/f"), 0o644).unwrap();

        driver.rmdir(&p("/d")).unwrap();

        assert!(!driver.is_directory(&p("/d")));
        // Descendants are untouched
        assert!(driver.is_file(&p("/d/f")));
    }

    #[test]
    fn test_rename_unknown_source() {
        let driver = NullDriver::new();
        assert_eq!(
            driver.rename(&p("/a"), &p("/b")),
            Err(NullFsError::not_found("/a"))
        );
        assert!(!driver.is_file(&p("/b")));
        assert!(!driver.is_directory(&p("/b")));
    }

    #[test]
    fn test_rename_prefers_directory() {
        let driver = NullDriver::new();
        driver.mkdir(&p("/x"), 0o755).unwrap();
        driver.create(&p("/x"), 0o644).unwrap();

        driver.rename(&p("/x"), &p("/y")).unwrap();

        assert!(driver.is_directory(&p("/y")));
        assert!(!driver.is_directory(&p("/x")));
        // The file-set key stays behind
        assert!(driver.is_file(&p("/x")));
    }

    #[test]
    fn test_rename_with_auto_vivify_creates_source() {
        let driver = NullDriver::with_config(NullFsConfig::default().auto_vivify_files(true));
        driver.rename(&p("/ghost"), &p("/real")).unwrap();
        assert!(driver.with_namespace(|ns| ns.contains_file(&p("/real"))));
        assert!(!driver.with_namespace(|ns| ns.contains_file(&p("/ghost"))));
    }

    #[test]
    fn test_metadata_verbs_are_noops() {
        let driver = NullDriver::new();
        driver.create(&p("/f"), 0o644).unwrap();

        driver.truncate(&p("/f"), 4096).unwrap();
        driver.chmod(&p("/f"), 0o600).unwrap();
        driver.chown(&p("/f"), Some(0), Some(0)).unwrap();
        driver
            .utimens(&p("/f"), Some(SystemTime::UNIX_EPOCH), None)
            .unwrap();
        // Also fine on paths that do not exist
        driver.truncate(&p("/missing"), 0).unwrap();

        assert_eq!(driver.getattr(&p("/f")).unwrap(), Attributes::file());
        assert_eq!(driver.with_namespace(Namespace::file_count), 1);
    }

    #[test]
    fn test_statfs() {
        let driver = NullDriver::new();
        assert_eq!(driver.statfs().unwrap(), FsCapacity::default());
    }

    #[test]
    fn test_stats_recorded() {
        let driver = NullDriver::new();
        driver.create(&p("/f"), 0o644).unwrap();
        driver.write(&p("/f"), b"12345", 0).unwrap();
        driver.getattr(&p("/missing")).unwrap_err();
        driver.readdir(&NsPath::root()).unwrap();

        let snap = driver.stats().snapshot();
        assert_eq!(snap.creates, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.bytes_discarded, 5);
        assert_eq!(snap.lookups, 1);
        assert_eq!(snap.not_found, 1);
        assert_eq!(snap.listings, 1);
    }

    #[test]
    fn test_stats_count_failed_file_verbs() {
        let driver = NullDriver::new();
        let mut buf = [0u8; 4];
        driver.open(&p("/missing")).unwrap_err();
        driver.read(&p("/missing"), &mut buf, 0).unwrap_err();
        driver.write(&p("/missing"), b"dropped", 0).unwrap_err();

        let snap = driver.stats().snapshot();
        assert_eq!(snap.opens, 1);
        assert_eq!(snap.reads, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.not_found, 3);
        assert_eq!(snap.bytes_discarded, 0);
    }
}
