//! Namespace engine for nullfs, a filesystem that stores no data.
//!
//! nullfs presents directories and files to a filesystem-call bridge, but
//! writes are discarded, reads are always empty and all metadata is
//! synthesized. What remains is the namespace: a flat store of full path
//! strings that simulates a hierarchy.
//!
//! # Components
//!
//! - [`path`]: splitting paths into parent and leaf, suffix classification
//! - [`namespace`]: the directory set and the file set
//! - [`listing`]: directory listing by linear scan
//! - [`attr`]: synthetic attributes and capacity
//! - [`ops`]: the [`FsOperations`] verb surface a bridge calls
//! - [`driver`]: [`NullDriver`], the mutex-guarded implementation
//!
//! # Usage
//!
//! ```
//! use nullfs_core::{EntryKind, FsOperations, NsPath, NullDriver, NullFsConfig};
//!
//! let driver = NullDriver::with_config(NullFsConfig::default());
//! driver.mkdir(&NsPath::new("/docs"), 0o755).unwrap();
//!
//! let names: Vec<String> = driver
//!     .readdir(&NsPath::root())
//!     .unwrap()
//!     .into_iter()
//!     .map(|e| e.name)
//!     .collect();
//! assert_eq!(names, vec![".", "..", "docs"]);
//!
//! let attr = driver.getattr(&NsPath::new("/docs")).unwrap();
//! assert_eq!(attr.kind, EntryKind::Directory);
//! ```

pub mod attr;
pub mod config;
pub mod driver;
pub mod error;
pub mod listing;
pub mod namespace;
pub mod ops;
pub mod path;
pub mod stats;

pub use attr::{Attributes, EntryKind, FsCapacity};
pub use config::{NullFsConfig, RmdirPolicy};
pub use driver::NullDriver;
pub use error::{NullFsError, NullFsResult};
pub use listing::{DirListingEntry, list_children};
pub use namespace::Namespace;
pub use ops::FsOperations;
pub use path::{NsPath, PathClass};
pub use stats::{OpStats, OpStatsSnapshot};
