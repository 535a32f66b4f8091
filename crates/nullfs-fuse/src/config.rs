//! Mount configuration for the FUSE bridge.
//!
//! A [`MountConfig`] carries the kernel-facing knobs (attribute TTL, mount
//! options) together with the [`NullFsConfig`] handed to the driver. It can
//! be built in code or read from a TOML file:
//!
//! ```toml
//! attr_ttl = "2s"
//! fsname = "scratch"
//! allow_other = false
//!
//! [namespace]
//! auto_vivify_files = true
//! rmdir_policy = "remove-directory"
//! ```

use crate::error::FuseResult;
use fuser::MountOption;
use nullfs_core::NullFsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default time-to-live for attributes handed to the kernel.
pub const DEFAULT_ATTR_TTL: Duration = Duration::from_secs(1);

/// Default filesystem name shown in the mount table.
pub const DEFAULT_FSNAME: &str = "nullfs";

/// Configuration options for a nullfs mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Time-to-live for attributes and entries returned to the kernel.
    ///
    /// Nothing changes behind the kernel's back except through this mount,
    /// so short TTLs only cost extra getattr round-trips.
    #[serde(with = "humantime_serde")]
    pub attr_ttl: Duration,

    /// Filesystem name reported to the mount table.
    pub fsname: String,

    /// Allow users other than the mounter to access the filesystem.
    pub allow_other: bool,

    /// Unmount automatically when the process exits.
    pub auto_unmount: bool,

    /// Driver behavior.
    pub namespace: NullFsConfig,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            attr_ttl: DEFAULT_ATTR_TTL,
            fsname: DEFAULT_FSNAME.to_string(),
            allow_other: false,
            auto_unmount: true,
            namespace: NullFsConfig::default(),
        }
    }
}

impl MountConfig {
    /// Reads a configuration from a TOML file. Missing keys take defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> FuseResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> FuseResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the attribute TTL.
    #[must_use]
    pub fn attr_ttl(mut self, ttl: Duration) -> Self {
        self.attr_ttl = ttl;
        self
    }

    /// Sets the filesystem name.
    #[must_use]
    pub fn fsname(mut self, name: impl Into<String>) -> Self {
        self.fsname = name.into();
        self
    }

    #[must_use]
    pub fn allow_other(mut self, allow: bool) -> Self {
        self.allow_other = allow;
        self
    }

    #[must_use]
    pub fn auto_unmount(mut self, enabled: bool) -> Self {
        self.auto_unmount = enabled;
        self
    }

    /// Replaces the driver configuration.
    #[must_use]
    pub fn namespace(mut self, config: NullFsConfig) -> Self {
        self.namespace = config;
        self
    }

    /// Mount options passed to fuser.
    pub fn mount_options(&self) -> Vec<MountOption> {
        let mut options = vec![
            MountOption::FSName(self.fsname.clone()),
            MountOption::Subtype("nullfs".to_string()),
            MountOption::RW,
        ];
        if self.allow_other {
            options.push(MountOption::AllowOther);
        }
        if self.auto_unmount {
            options.push(MountOption::AutoUnmount);
        }
        options
    }
}
