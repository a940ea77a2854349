//! Trace utilities

/// Trace category for diff rendering.
pub const DIFF: &str = "diff";
/// Trace category for file predicates.
pub const FILES: &str = "files";
/// Trace category for log file scanning.
pub const LOGFILE: &str = "logfile";
/// Trace category for similarity comparisons.
pub const SIMILARITY: &str = "similarity";
