//! Common test infrastructure for FUSE integration tests.
//!
//! Provides the `TestMount` harness for testing the bridge through actual
//! kernel mounts.

pub mod harness;

pub use harness::TestMount;

// Macros (skip_if_no_fuse!, require_mount!) are #[macro_export] so they're
// available at the crate root. No need to re-export them here.
