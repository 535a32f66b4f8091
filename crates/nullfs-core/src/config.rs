//! Driver configuration.
//!
//! Both options default to the historical behavior of the driver: unknown
//! paths are reported missing, and `rmdir` shares its handler with `unlink`.
//!
//! # Example configuration
//!
//! ```toml
//! auto_vivify_files = true
//! rmdir_policy = "remove-directory"
//! ```

use serde::{Deserialize, Serialize};

/// What `rmdir` does to the namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RmdirPolicy {
    /// Same handler as `unlink`: only the file set is touched, so the
    /// directory entry survives. Always reports success.
    #[default]
    AliasUnlink,
    /// Remove the path from the directory set. Descendants are left alone.
    RemoveDirectory,
}

/// Configuration options for [`NullDriver`](crate::driver::NullDriver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullFsConfig {
    /// Create an empty file entry whenever a file query misses.
    ///
    /// Affects getattr, open, read, write and rename. Default: false.
    pub auto_vivify_files: bool,

    /// Behavior of `rmdir`. Default: [`RmdirPolicy::AliasUnlink`].
    pub rmdir_policy: RmdirPolicy,
}

impl NullFsConfig {
    /// Enables or disables auto-vivification of queried files.
    #[must_use]
    pub fn auto_vivify_files(mut self, enabled: bool) -> Self {
        self.auto_vivify_files = enabled;
        self
    }

    /// Sets the `rmdir` policy.
    #[must_use]
    pub fn rmdir_policy(mut self, policy: RmdirPolicy) -> Self {
        self.rmdir_policy = policy;
        self
    }
}
