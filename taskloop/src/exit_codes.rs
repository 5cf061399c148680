//! Stable exit codes for taskloop CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid flags/config/files or other errors.
pub const INVALID: i32 = 1;
/// The agent never produced a parseable task list.
pub const RETRY_EXHAUSTED: i32 = 2;
/// The agent executable is not installed or not on PATH.
pub const AGENT_MISSING: i32 = 3;
