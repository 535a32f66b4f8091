//! Test mount harness for FUSE integration tests.
//!
//! Provides `TestMount` that manages the lifecycle of a mounted nullfs
//! namespace, including setup, teardown, and convenience methods for
//! filesystem operations.

// Not all tests use all TestMount methods
#![allow(dead_code)]

use fuser::BackgroundSession;
use nullfs_core::NullFsConfig;
use nullfs_fuse::{spawn_mount, MountConfig, NullFS};
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// How long to wait for mount to become ready.
const MOUNT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait between mount readiness checks.
const MOUNT_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// A mounted nullfs namespace for testing.
///
/// Attribute caching is disabled so every `stat` reaches the filesystem.
///
/// # Example
///
/// ```ignore
/// use common::TestMount;
///
/// #[test]
/// fn test_write_is_discarded() {
///     let mount = TestMount::new().unwrap();
///     mount.write("test.txt", b"hello").unwrap();
///     assert!(mount.read("test.txt").unwrap().is_empty());
/// }
/// ```
pub struct TestMount {
    /// The FUSE session (unmounts on drop).
    _session: BackgroundSession,
    /// Path where the namespace is mounted.
    pub mount_path: PathBuf,
    /// Temporary mount point directory.
    _temp_mount: TempDir,
}

impl TestMount {
    /// Mount an empty namespace with the default driver behavior.
    pub fn new() -> Result<Self, String> {
        Self::with_config(NullFsConfig::default())
    }

    /// Mount an empty namespace with custom driver behavior.
    pub fn with_config(namespace: NullFsConfig) -> Result<Self, String> {
        let temp_mount = TempDir::new().map_err(|e| format!("Failed to create temp dir: {e}"))?;
        let mount_path = temp_mount.path().join("mnt");
        fs::create_dir(&mount_path).map_err(|e| format!("Failed to create mount point: {e}"))?;

        let config = MountConfig::default()
            .fsname("nullfs-test")
            .attr_ttl(Duration::ZERO)
            .namespace(namespace);

        let session = spawn_mount(NullFS::new(config.clone()), &mount_path, &config)
            .map_err(|e| format!("Failed to mount: {e}"))?;

        Self::wait_for_mount(&mount_path)?;

        Ok(Self {
            _session: session,
            mount_path,
            _temp_mount: temp_mount,
        })
    }

    fn wait_for_mount(mount_path: &Path) -> Result<(), String> {
        let deadline = Instant::now() + MOUNT_READY_TIMEOUT;
        while Instant::now() < deadline {
            if fs::read_dir(mount_path).is_ok() {
                return Ok(());
            }
            thread::sleep(MOUNT_CHECK_INTERVAL);
        }
        Err("Mount did not become ready in time".to_string())
    }

    // =========================================================================
    // Filesystem convenience methods
    // =========================================================================

    /// Build a full path from a relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.mount_path.join(relative.trim_start_matches('/'))
    }

    /// Read a file's contents.
    pub fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut content = Vec::new();
        File::open(self.path(path))?.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Write content to a file (creates if missing).
    pub fn write(&self, path: &str, content: &[u8]) -> io::Result<()> {
        let mut file = File::create(self.path(path))?;
        file.write_all(content)?;
        file.sync_all()?;
        Ok(())
    }

    /// Create an empty file.
    pub fn touch(&self, path: &str) -> io::Result<()> {
        File::create(self.path(path)).map(drop)
    }

    pub fn mkdir(&self, path: &str) -> io::Result<()> {
        fs::create_dir(self.path(path))
    }

    pub fn remove(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.path(path))
    }

    pub fn rmdir(&self, path: &str) -> io::Result<()> {
        fs::remove_dir(self.path(path))
    }

    pub fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.path(from), self.path(to))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.path(path).exists()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.path(path).is_dir()
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.path(path).is_file()
    }

    pub fn metadata(&self, path: &str) -> io::Result<Metadata> {
        fs::metadata(self.path(path))
    }

    /// List directory entries (names only, sorted).
    ///
    /// `read_dir` never yields `.` or `..`.
    pub fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(self.path(path))?
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Check if FUSE is available on this system.
pub fn fuse_available() -> bool {
    #[cfg(target_os = "linux")]
    {
        Path::new("/dev/fuse").exists()
    }
    #[cfg(target_os = "macos")]
    {
        Path::new("/Library/Filesystems/macfuse.fs").exists()
            || Path::new("/Library/Filesystems/osxfuse.fs").exists()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        false
    }
}

/// Skip test if FUSE is not available.
#[macro_export]
macro_rules! skip_if_no_fuse {
    () => {
        if !$crate::common::harness::fuse_available() {
            eprintln!("Skipping test: FUSE not available on this system");
            return;
        }
    };
}

/// Skip test if mounting fails (common in CI environments).
#[macro_export]
macro_rules! require_mount {
    ($mount_result:expr) => {
        match $mount_result {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                return;
            }
        }
    };
}
