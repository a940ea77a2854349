//! Trace utilities

/// Trace category for test directory resolution.
pub const DIRS: &str = "dirs";
/// Trace category for the test-run index.
pub const INDEX: &str = "index";
/// Trace category for test lifecycle messages.
pub const LIFECYCLE: &str = "lifecycle";
