//! Inode management for the FUSE bridge.
//!
//! The namespace engine is keyed by path strings; the kernel speaks in inode
//! numbers. This table binds the two and tracks kernel lookup counts so
//! entries can be dropped on `forget()`.

use dashmap::DashMap;
use nullfs_core::NsPath;
use std::sync::atomic::{AtomicU64, Ordering};

/// The root inode number (FUSE convention).
pub const ROOT_INODE: u64 = 1;

/// An entry in the inode table.
#[derive(Debug)]
pub struct InodeEntry {
    /// The namespace path this inode currently names.
    pub path: NsPath,
    /// Kernel lookup count.
    nlookup: AtomicU64,
}

impl InodeEntry {
    fn new(path: NsPath, nlookup: u64) -> Self {
        Self {
            path,
            nlookup: AtomicU64::new(nlookup),
        }
    }

    /// Increments the lookup count and returns the new value.
    pub fn inc_nlookup(&self) -> u64 {
        self.nlookup.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Decrements the lookup count by the given amount and returns the new value.
    /// Returns `None` if the count would go negative.
    pub fn dec_nlookup(&self, count: u64) -> Option<u64> {
        let old = self.nlookup.fetch_sub(count, Ordering::SeqCst);
        if old < count {
            self.nlookup.fetch_add(count, Ordering::SeqCst);
            None
        } else {
            Some(old - count)
        }
    }

    /// Returns the current lookup count.
    pub fn nlookup(&self) -> u64 {
        self.nlookup.load(Ordering::SeqCst)
    }
}

/// Thread-safe table mapping between inodes and namespace paths.
///
/// This table maintains a bidirectional mapping:
/// - `path_to_inode`: NsPath -> inode number
/// - `inode_to_entry`: inode number -> InodeEntry
pub struct InodeTable {
    path_to_inode: DashMap<NsPath, u64>,
    inode_to_entry: DashMap<u64, InodeEntry>,
    next_inode: AtomicU64,
}

impl InodeTable {
    /// Creates a new inode table with `/` bound to [`ROOT_INODE`].
    pub fn new() -> Self {
        let table = Self {
            path_to_inode: DashMap::new(),
            inode_to_entry: DashMap::new(),
            next_inode: AtomicU64::new(ROOT_INODE + 1),
        };

        let root = NsPath::root();
        table.path_to_inode.insert(root.clone(), ROOT_INODE);
        table
            .inode_to_entry
            .insert(ROOT_INODE, InodeEntry::new(root, 1));

        table
    }

    /// Returns the inode for `path`, counting one kernel lookup.
    ///
    /// Allocates a fresh inode if the path has none.
    pub fn get_or_insert(&self, path: NsPath) -> u64 {
        self.bind(path, true)
    }

    /// Returns the inode for `path` without counting a lookup.
    ///
    /// Used for directory listings, where the kernel does not take a
    /// reference on the reported inode numbers.
    pub fn assign(&self, path: NsPath) -> u64 {
        self.bind(path, false)
    }

    fn bind(&self, path: NsPath, counted: bool) -> u64 {
        if let Some(inode) = self.path_to_inode.get(&path) {
            let ino = *inode;
            if counted && let Some(entry) = self.inode_to_entry.get(&ino) {
                entry.inc_nlookup();
            }
            return ino;
        }

        // Entry API closes the race between two first lookups of one path
        let inode = self
            .path_to_inode
            .entry(path.clone())
            .or_insert_with(|| {
                let ino = self.next_inode.fetch_add(1, Ordering::SeqCst);
                self.inode_to_entry
                    .insert(ino, InodeEntry::new(path.clone(), u64::from(counted)));
                ino
            });

        *inode
    }

    /// Looks up an entry by inode number.
    pub fn get(&self, inode: u64) -> Option<dashmap::mapref::one::Ref<'_, u64, InodeEntry>> {
        self.inode_to_entry.get(&inode)
    }

    /// Looks up an inode by path.
    pub fn get_inode(&self, path: &NsPath) -> Option<u64> {
        self.path_to_inode.get(path).map(|r| *r)
    }

    /// Returns a copy of the path bound to `inode`.
    pub fn path_of(&self, inode: u64) -> Option<NsPath> {
        self.inode_to_entry.get(&inode).map(|e| e.path.clone())
    }

    /// Decrements the lookup count for an inode.
    /// Returns `true` if the inode was evicted.
    pub fn forget(&self, inode: u64, nlookup: u64) -> bool {
        if inode == ROOT_INODE {
            return false;
        }

        if let Some(entry) = self.inode_to_entry.get(&inode)
            && let Some(remaining) = entry.dec_nlookup(nlookup)
            && remaining == 0
        {
            drop(entry);
            return self.evict(inode);
        }
        false
    }

    fn evict(&self, inode: u64) -> bool {
        if let Some((_, entry)) = self.inode_to_entry.remove(&inode) {
            // Only drop the path mapping if it still points here
            self.path_to_inode
                .remove_if(&entry.path, |_, ino| *ino == inode);
            true
        } else {
            false
        }
    }

    /// Removes the path mapping after unlink or rmdir.
    ///
    /// The inode entry survives until the kernel forgets it.
    pub fn invalidate_path(&self, path: &NsPath) {
        if path.is_root() {
            return;
        }
        self.path_to_inode.remove(path);
    }

    /// Rebinds the inode of `old_path`, if any, to `new_path`.
    pub fn rename_path(&self, old_path: &NsPath, new_path: NsPath) {
        let Some((_, inode)) = self.path_to_inode.remove(old_path) else {
            // Nothing cached for the source; a stale target binding must go
            self.path_to_inode.remove(&new_path);
            return;
        };
        self.path_to_inode.insert(new_path.clone(), inode);

        if let Some(mut entry) = self.inode_to_entry.get_mut(&inode) {
            entry.path = new_path;
        }
    }

    /// Returns the number of inodes currently in the table.
    pub fn len(&self) -> usize {
        self.inode_to_entry.len()
    }

    /// Returns true if the table only contains the root inode.
    pub fn is_empty(&self) -> bool {
        self.inode_to_entry.len() <= 1
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}
