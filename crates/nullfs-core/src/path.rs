//! Path model for the flat namespace.
//!
//! Paths are plain absolute strings. Nothing is normalized: `..` is never
//! collapsed, repeated separators are kept, and symlinks do not exist. The
//! bridge resolves paths before they reach the driver, so the only parsing
//! done here is splitting a path at its last separator and classifying the
//! suffix tokens that mark a path as a directory without it being stored.
//!
//! # Examples
//!
//! ```
//! use nullfs_core::path::{NsPath, PathClass};
//!
//! let path = NsPath::new("/docs/readme.txt");
//! assert_eq!(path.parent(), "/docs");
//! assert_eq!(path.leaf(), "readme.txt");
//! assert_eq!(path.class(), PathClass::Plain);
//!
//! let top = NsPath::new("/docs");
//! assert_eq!(top.parent(), "/");
//!
//! assert!(NsPath::new("/docs/..").is_special());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path component separator.
pub const SEPARATOR: char = '/';

/// The root path. Never stored; a directory through [`PathClass::TrailingSeparator`].
pub const ROOT: &str = "/";

/// Name of the self-directory marker.
pub const SELF_MARKER: &str = ".";

/// Name of the parent-directory marker.
pub const PARENT_MARKER: &str = "..";

/// Classification of a path's suffix.
///
/// Anything other than [`PathClass::Plain`] is treated as a directory by the
/// namespace even when the path is absent from the directory set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathClass {
    /// No special suffix.
    Plain,
    /// Ends with a separator (includes the root path).
    TrailingSeparator,
    /// Ends with `/.` or is exactly `.`.
    SelfMarker,
    /// Ends with `/..` or is exactly `..`.
    ParentMarker,
}

impl PathClass {
    /// Classifies a raw path string.
    pub fn classify(path: &str) -> Self {
        if path.ends_with(SEPARATOR) {
            PathClass::TrailingSeparator
        } else if path == PARENT_MARKER || path.ends_with("/..") {
            PathClass::ParentMarker
        } else if path == SELF_MARKER || path.ends_with("/.") {
            PathClass::SelfMarker
        } else {
            PathClass::Plain
        }
    }

    /// Returns true for every class except [`PathClass::Plain`].
    #[inline]
    pub fn is_special(self) -> bool {
        self != PathClass::Plain
    }
}

/// Returns true if `path` should be treated as a directory by suffix alone.
#[inline]
pub fn classify_special(path: &str) -> bool {
    PathClass::classify(path).is_special()
}

/// Computes the parent of `path`.
///
/// The parent is the prefix before the last separator, or [`ROOT`] when that
/// separator is the first character. A string with no separator at all is
/// returned unchanged.
pub fn parent_of(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(0) => ROOT,
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Returns the leaf name: everything after the last separator.
pub fn leaf_of(path: &str) -> &str {
    path.rsplit_once(SEPARATOR).map_or(path, |(_, leaf)| leaf)
}

/// An absolute namespace path.
///
/// Ordering is plain lexicographic byte order of the underlying string, which
/// is the order directory listings are produced in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NsPath(String);

impl NsPath {
    /// Wraps a path string as-is.
    pub fn new(path: impl Into<String>) -> Self {
        NsPath(path.into())
    }

    /// The root path `/`.
    #[inline]
    pub fn root() -> Self {
        NsPath(ROOT.to_string())
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Suffix classification of this path.
    #[inline]
    pub fn class(&self) -> PathClass {
        PathClass::classify(&self.0)
    }

    /// See [`classify_special`].
    #[inline]
    pub fn is_special(&self) -> bool {
        self.class().is_special()
    }

    /// See [`parent_of`].
    #[inline]
    pub fn parent(&self) -> &str {
        parent_of(&self.0)
    }

    /// See [`leaf_of`].
    #[inline]
    pub fn leaf(&self) -> &str {
        leaf_of(&self.0)
    }

    /// Builds the path of a child named `name` inside this directory.
    ///
    /// ```
    /// use nullfs_core::path::NsPath;
    ///
    /// assert_eq!(NsPath::root().join("docs").as_str(), "/docs");
    /// assert_eq!(NsPath::new("/docs").join("a.txt").as_str(), "/docs/a.txt");
    /// ```
    pub fn join(&self, name: &str) -> Self {
        if self.0.ends_with(SEPARATOR) {
            NsPath(format!("{}{name}", self.0))
        } else {
            NsPath(format!("{}{SEPARATOR}{name}", self.0))
        }
    }
}

impl AsRef<str> for NsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NsPath {
    fn from(s: &str) -> Self {
        NsPath::new(s)
    }
}

impl From<String> for NsPath {
    fn from(s: String) -> Self {
        NsPath(s)
    }
}
