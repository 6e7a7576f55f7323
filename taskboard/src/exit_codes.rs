//! Stable exit codes for taskboard CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config, unreadable files, or other errors.
pub const INVALID: i32 = 1;
/// The task board file does not exist.
pub const BOARD_MISSING: i32 = 2;
