//! Operation statistics for the driver.
//!
//! Lock-free counters, one per verb class, plus the number of bytes the null
//! sink has accepted and thrown away.
//!
//! # Usage
//!
//! ```
//! use nullfs_core::stats::OpStats;
//!
//! let stats = OpStats::new();
//! stats.record_write();
//! stats.record_discarded(4096);
//! stats.record_not_found();
//!
//! let snap = stats.snapshot();
//! assert_eq!(snap.writes, 1);
//! assert_eq!(snap.bytes_discarded, 4096);
//! assert_eq!(snap.not_found, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for driver operations.
#[derive(Debug, Default)]
pub struct OpStats {
    lookups: AtomicU64,
    listings: AtomicU64,
    opens: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    creates: AtomicU64,
    removals: AtomicU64,
    renames: AtomicU64,
    not_found: AtomicU64,
    bytes_discarded: AtomicU64,
}

impl OpStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_listing(&self) {
        self.listings.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_open(&self) {
        self.opens.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `bytes` bytes that a write acknowledged and dropped.
    #[inline]
    pub fn record_discarded(&self, bytes: u64) {
        self.bytes_discarded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a create, mknod or mkdir.
    #[inline]
    pub fn record_create(&self) {
        self.creates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an unlink or rmdir.
    #[inline]
    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rename(&self) {
        self.renames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an operation that failed with NotFound.
    #[inline]
    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.lookups,
            &self.listings,
            &self.opens,
            &self.reads,
            &self.writes,
            &self.creates,
            &self.removals,
            &self.renames,
            &self.not_found,
            &self.bytes_discarded,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Create a snapshot of current values.
    pub fn snapshot(&self) -> OpStatsSnapshot {
        OpStatsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            listings: self.listings.load(Ordering::Relaxed),
            opens: self.opens.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            creates: self.creates.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            renames: self.renames.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
        }
    }
}

/// A serializable snapshot of [`OpStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpStatsSnapshot {
    pub lookups: u64,
    pub listings: u64,
    pub opens: u64,
    pub reads: u64,
    pub writes: u64,
    pub creates: u64,
    pub removals: u64,
    pub renames: u64,
    pub not_found: u64,
    pub bytes_discarded: u64,
}

impl OpStatsSnapshot {
    /// Total number of operations recorded.
    pub fn total_ops(&self) -> u64 {
        self.lookups
            + self.listings
            + self.opens
            + self.reads
            + self.writes
            + self.creates
            + self.removals
            + self.renames
    }
}
