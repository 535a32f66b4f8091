//! Directory listing by linear scan.
//!
//! With no parent index, listing a directory walks the whole namespace and
//! keeps every entry whose computed parent string equals the queried path
//! exactly. `/docs` therefore never picks up `/docsx/a` or `/docs/a/b`.

use crate::attr::EntryKind;
use crate::namespace::Namespace;
use crate::path::{NsPath, PARENT_MARKER, SELF_MARKER};

/// One name returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListingEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirListingEntry {
    fn new(name: &str, kind: EntryKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    /// True for the `.` and `..` entries.
    pub fn is_marker(&self) -> bool {
        self.name == SELF_MARKER || self.name == PARENT_MARKER
    }
}

/// Lists the immediate children of `dir`.
///
/// Output order: `.`, `..`, matching files, matching directories; each set in
/// lexicographic path order. A path held in both sets is listed twice. The
/// listing never fails, even for a path that is not a directory.
pub fn list_children(ns: &Namespace, dir: &NsPath) -> Vec<DirListingEntry> {
    let mut entries = vec![
        DirListingEntry::new(SELF_MARKER, EntryKind::Directory),
        DirListingEntry::new(PARENT_MARKER, EntryKind::Directory),
    ];

    let query = dir.as_str();
    entries.extend(
        ns.files()
            .filter(|file| file.parent() == query)
            .map(|file| DirListingEntry::new(file.leaf(), EntryKind::RegularFile)),
    );
    entries.extend(
        ns.directories()
            .filter(|sub| sub.parent() == query)
            .map(|sub| DirListingEntry::new(sub.leaf(), EntryKind::Directory)),
    );

    entries
}
