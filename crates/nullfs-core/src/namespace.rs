//! The namespace store: two sets of full path strings.
//!
//! There is no tree. A directory is a path in the directory set, a file is a
//! path in the file set, and the hierarchy is recovered on demand by
//! comparing each stored path's parent string (see [`crate::listing`]).
//!
//! Only set semantics are enforced:
//! - keys are unique within each set
//! - a path may sit in both sets at once
//! - mutations never check that a parent directory exists

use crate::path::NsPath;
use std::collections::BTreeSet;

/// Directory set plus file set.
#[derive(Debug, Default)]
pub struct Namespace {
    dirs: BTreeSet<NsPath>,
    files: BTreeSet<NsPath>,
    auto_vivify_files: bool,
}

impl Namespace {
    /// Creates an empty namespace with auto-vivify disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty namespace, optionally auto-vivifying queried files.
    pub fn with_auto_vivify(auto_vivify_files: bool) -> Self {
        Self {
            auto_vivify_files,
            ..Self::default()
        }
    }

    pub fn auto_vivify_enabled(&self) -> bool {
        self.auto_vivify_files
    }

    /// Directory-set membership, or a special suffix (`/`, `/.`, `/..`).
    pub fn is_directory(&self, path: &NsPath) -> bool {
        self.dirs.contains(path) || path.is_special()
    }

    /// Plain file-set membership. Never mutates.
    pub fn contains_file(&self, path: &NsPath) -> bool {
        self.files.contains(path)
    }

    /// File-set membership, creating the entry on a miss when auto-vivify is on.
    ///
    /// Paths that already resolve as directories are never vivified.
    pub fn is_file(&mut self, path: &NsPath) -> bool {
        if self.files.contains(path) {
            return true;
        }
        if self.auto_vivify_files && !self.is_directory(path) {
            tracing::debug!(path = %path, "Auto-vivifying file entry");
            self.files.insert(path.clone());
            return true;
        }
        false
    }

    /// Returns true if the path was not already in the directory set.
    pub fn add_directory(&mut self, path: &NsPath) -> bool {
        self.dirs.insert(path.clone())
    }

    /// Returns true if the path was present.
    pub fn remove_directory(&mut self, path: &NsPath) -> bool {
        self.dirs.remove(path)
    }

    /// Returns true if the path was not already in the file set.
    pub fn add_file(&mut self, path: &NsPath) -> bool {
        self.files.insert(path.clone())
    }

    /// Returns true if the path was present.
    pub fn remove_file(&mut self, path: &NsPath) -> bool {
        self.files.remove(path)
    }

    /// Moves a single key within the directory set.
    ///
    /// Entries recorded under `src` keep their old parent string.
    pub fn rename_directory(&mut self, src: &NsPath, dst: &NsPath) {
        self.dirs.remove(src);
        self.dirs.insert(dst.clone());
    }

    /// Moves a single key within the file set.
    pub fn rename_file(&mut self, src: &NsPath, dst: &NsPath) {
        self.files.remove(src);
        self.files.insert(dst.clone());
    }

    /// Directory entries in lexicographic order.
    pub fn directories(&self) -> impl Iterator<Item = &NsPath> {
        self.dirs.iter()
    }

    /// File entries in lexicographic order.
    pub fn files(&self) -> impl Iterator<Item = &NsPath> {
        self.files.iter()
    }

    pub fn directory_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> NsPath {
        NsPath::new(s)
    }

    #[test]
    fn test_empty_namespace() {
        let ns = Namespace::new();
        assert!(ns.is_empty());
        assert!(!ns.auto_vivify_enabled());
        assert!(!ns.contains_file(&p("/a")));
    }

    #[test]
    fn test_root_is_implicit_directory() {
        let ns = Namespace::new();
        assert!(ns.is_directory(&NsPath::root()));
        assert_eq!(ns.directory_count(), 0);
    }

    #[test]
    fn test_special_suffixes_are_directories() {
        let ns = Namespace::new();
        assert!(ns.is_directory(&p("/nowhere/")));
        assert!(ns.is_directory(&p("/nowhere/.")));
        assert!(ns.is_directory(&p("/nowhere/..")));
        assert!(!ns.is_directory(&p("/nowhere")));
    }

    #[test]
    fn test_add_and_remove_directory() {
        let mut ns = Namespace::new();
        assert!(ns.add_directory(&p("/docs")));
        assert!(!ns.add_directory(&p("/docs")));
        assert!(ns.is_directory(&p("/docs")));
        assert!(ns.remove_directory(&p("/docs")));
        assert!(!ns.is_directory(&p("/docs")));
        assert!(!ns.remove_directory(&p("/docs")));
    }

    #[test]
    fn test_add_without_parent() {
        let mut ns = Namespace::new();
        ns.add_file(&p("/no/such/parent/file"));
        assert!(ns.is_file(&p("/no/such/parent/file")));
        assert!(!ns.is_directory(&p("/no/such/parent")));
    }

    #[test]
    fn test_path_in_both_sets() {
        let mut ns = Namespace::new();
        ns.add_directory(&p("/both"));
        ns.add_file(&p("/both"));
        assert!(ns.is_directory(&p("/both")));
        assert!(ns.is_file(&p("/both")));
        assert_eq!(ns.directory_count(), 1);
        assert_eq!(ns.file_count(), 1);
    }

    #[test]
    fn test_is_file_without_auto_vivify() {
        let mut ns = Namespace::new();
        assert!(!ns.is_file(&p("/ghost")));
        assert_eq!(ns.file_count(), 0);
    }

    #[test]
    fn test_is_file_with_auto_vivify() {
        let mut ns = Namespace::with_auto_vivify(true);
        assert!(ns.is_file(&p("/ghost")));
        assert!(ns.contains_file(&p("/ghost")));
        assert_eq!(ns.file_count(), 1);
    }

    #[test]
    fn test_auto_vivify_skips_directories() {
        let mut ns = Namespace::with_auto_vivify(true);
        ns.add_directory(&p("/docs"));
        assert!(!ns.is_file(&p("/docs")));
        assert!(!ns.is_file(&p("/docs/..")));
        assert_eq!(ns.file_count(), 0);
    }

    #[test]
    fn test_rename_file() {
        let mut ns = Namespace::new();
        ns.add_file(&p("/a"));
        ns.rename_file(&p("/a"), &p("/b"));
        assert!(!ns.contains_file(&p("/a")));
        assert!(ns.contains_file(&p("/b")));
    }

    #[test]
    fn test_rename_file_onto_itself() {
        let mut ns = Namespace::new();
        ns.add_file(&p("/a"));
        ns.rename_file(&p("/a"), &p("/a"));
        assert!(ns.contains_file(&p("/a")));
    }

    #[test]
    fn test_rename_directory_moves_only_the_key() {
        let mut ns = Namespace::new();
        ns.add_directory(&p("/old"));
        ns.add_directory(&p("/old/sub"));
        ns.add_file(&p("/old/file"));

        ns.rename_directory(&p("/old"), &p("/new"));

        assert!(ns.is_directory(&p("/new")));
        assert!(!ns.is_directory(&p("/old")));
        assert!(ns.is_directory(&p("/old/sub")));
        assert!(ns.contains_file(&p("/old/file")));
        assert!(!ns.contains_file(&p("/new/file")));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut ns = Namespace::new();
        for name in ["/c", "/a", "/b"] {
            ns.add_file(&p(name));
        }
        let files: Vec<_> = ns.files().map(NsPath::as_str).collect();
        assert_eq!(files, vec!["/a", "/b", "/c"]);
    }
}
